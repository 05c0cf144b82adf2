//! Scoring forecasts made in a transformed target space.
//!
//! Models are fit on the Box-Cox or log representation of PM2.5. Their
//! predictions are mapped back to the original scale before RMSE is computed
//! against the untransformed target. Pairs where either side is NaN are
//! skipped.

use crate::error::{CheckerError, Result, ResultExt};
use crate::target::{TargetColumn, TargetPresence};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Forward transform that was applied to the target upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetTransform {
    BoxCox { lambda: f64 },
    Log,
}

impl TargetTransform {
    /// Map a transformed value back to the original scale.
    ///
    /// Box-Cox values outside the transform's range yield NaN.
    pub fn inverse(&self, y: f64) -> f64 {
        match *self {
            Self::BoxCox { lambda } if lambda == 0.0 => y.exp(),
            Self::BoxCox { lambda } => ((lambda * y).ln_1p() / lambda).exp(),
            Self::Log => y.exp(),
        }
    }

    /// Which transformed column this transform produces.
    pub fn target_column(&self) -> TargetColumn {
        match self {
            Self::BoxCox { .. } => TargetColumn::BoxCox,
            Self::Log => TargetColumn::Log,
        }
    }
}

/// RMSE and how many points it covered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub rmse: f64,
    pub valid_points: usize,
    pub total_points: usize,
}

/// Root mean squared error over pairs where neither side is NaN.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<EvaluationSummary> {
    if actual.len() != predicted.len() {
        return Err(CheckerError::LengthMismatch {
            left: actual.len(),
            right: predicted.len(),
        });
    }

    let (sum, count) = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| !a.is_nan() && !p.is_nan())
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + (a - p).powi(2), count + 1)
        });

    if count == 0 {
        return Err(CheckerError::NoValidValues("predictions".to_string()));
    }

    Ok(EvaluationSummary {
        rmse: (sum / count as f64).sqrt(),
        valid_points: count,
        total_points: actual.len(),
    })
}

/// The transformed column a table carries when it disagrees with `transform`.
///
/// `None` when the table carries the matching column, both, or neither.
pub fn transform_mismatch(df: &DataFrame, transform: TargetTransform) -> Option<TargetColumn> {
    match TargetColumn::detect(df) {
        TargetPresence::One(present) if present != transform.target_column() => Some(present),
        _ => None,
    }
}

/// Inverse-transform `predicted_col` and score it against `actual_col`.
///
/// Nulls in either column are treated as NaN.
pub fn evaluate_predictions(
    df: &DataFrame,
    actual_col: &str,
    predicted_col: &str,
    transform: TargetTransform,
) -> Result<EvaluationSummary> {
    if let Some(present) = transform_mismatch(df, transform) {
        warn!(
            "Table carries '{}' but predictions are inverted as '{}'",
            present,
            transform.target_column()
        );
    }

    let actual = column_as_f64(df, actual_col)?;
    let predicted: Vec<f64> = column_as_f64(df, predicted_col)?
        .into_iter()
        .map(|y| transform.inverse(y))
        .collect();

    let summary = rmse(&actual, &predicted).context(format!(
        "Scoring '{predicted_col}' against '{actual_col}'"
    ))?;

    let skipped = summary.total_points - summary.valid_points;
    if skipped > 0 {
        warn!("Skipped {} of {} points with NaN values", skipped, summary.total_points);
    }
    info!("RMSE (original PM2.5 scale): {}", summary.rmse);
    Ok(summary)
}

fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| CheckerError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_inverse_boxcox() {
        let t = TargetTransform::BoxCox { lambda: 0.5 };
        // forward: (x^0.5 - 1) / 0.5 for x = 9 gives 4
        assert_close(t.inverse(4.0), 9.0);

        let t = TargetTransform::BoxCox { lambda: 0.0 };
        assert_close(t.inverse(1.0), std::f64::consts::E);
    }

    #[test]
    fn test_inverse_boxcox_out_of_range_is_nan() {
        let t = TargetTransform::BoxCox { lambda: 0.5 };
        assert!(t.inverse(-4.0).is_nan());
    }

    #[test]
    fn test_inverse_log() {
        assert_close(TargetTransform::Log.inverse(0.0), 1.0);
        assert_eq!(TargetTransform::Log.target_column(), TargetColumn::Log);
    }

    #[test]
    fn test_rmse_skips_nan_pairs() {
        let summary = rmse(&[1.0, f64::NAN, 3.0], &[2.0, 5.0, 3.0]).unwrap();
        assert_close(summary.rmse, (0.5f64).sqrt());
        assert_eq!(summary.valid_points, 2);
        assert_eq!(summary.total_points, 3);
    }

    #[test]
    fn test_rmse_errors() {
        assert_eq!(rmse(&[1.0], &[1.0, 2.0]).unwrap_err().error_code(), "LENGTH_MISMATCH");
        assert_eq!(
            rmse(&[f64::NAN], &[1.0]).unwrap_err().error_code(),
            "NO_VALID_VALUES"
        );
    }

    #[test]
    fn test_evaluate_predictions() {
        let df = df!(
            "pm25" => [Some(9.0), Some(4.0), None],
            "yhat" => [4.0, 2.0, 1.0]
        )
        .unwrap();
        let summary =
            evaluate_predictions(&df, "pm25", "yhat", TargetTransform::BoxCox { lambda: 0.5 })
                .unwrap();
        // inverse(2.0) = 4.0, inverse(4.0) = 9.0 -> perfect on the valid pairs
        assert_close(summary.rmse, 0.0);
        assert_eq!(summary.valid_points, 2);
    }

    #[test]
    fn test_transform_mismatch() {
        let df = df!("pm25" => [9.0], "pm25_boxcox" => [4.0], "yhat" => [4.0]).unwrap();
        assert_eq!(
            transform_mismatch(&df, TargetTransform::Log),
            Some(TargetColumn::BoxCox)
        );
        assert_eq!(
            transform_mismatch(&df, TargetTransform::BoxCox { lambda: 0.5 }),
            None
        );

        let plain = df!("pm25" => [9.0], "yhat" => [4.0]).unwrap();
        assert_eq!(transform_mismatch(&plain, TargetTransform::Log), None);
    }

    #[test]
    fn test_evaluate_missing_column() {
        let df = df!("pm25" => [1.0]).unwrap();
        let err = evaluate_predictions(&df, "pm25", "yhat", TargetTransform::Log).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
