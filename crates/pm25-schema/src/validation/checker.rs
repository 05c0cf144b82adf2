use crate::error::{Result, ResultExt};
use crate::schema::{ColumnRule, DataKind, Schema, SignConstraint};
use crate::target::{TargetColumn, TargetPresence};
use crate::types::{ColumnStats, FindingKind, Severity, ValidationReport};
use crate::utils::{format_stat, is_numeric_dtype, min_max, missing_count, present_values};
use polars::prelude::*;
use tracing::{debug, error, info, warn};

/// Validates datasets against a [`Schema`].
///
/// Findings are logged through `tracing` as they are recorded and collected
/// into the returned [`ValidationReport`]. The input table is never modified.
pub struct SchemaChecker;

impl SchemaChecker {
    pub fn validate(df: &DataFrame, schema: &Schema) -> Result<ValidationReport> {
        let mut report = ValidationReport::new(df.height());
        debug!(
            "Validating {} rows x {} columns against {} schema columns",
            df.height(),
            df.width(),
            schema.len()
        );

        match TargetColumn::detect(df) {
            TargetPresence::Both => {
                Self::emit(
                    &mut report,
                    FindingKind::BothTargetColumns,
                    None,
                    "Both 'pm25_boxcox' and 'pm25_log' columns are present. Only one should be present.",
                );
                return Ok(report);
            }
            TargetPresence::Neither => {
                Self::emit(
                    &mut report,
                    FindingKind::NoTargetColumn,
                    None,
                    "Neither 'pm25_boxcox' nor 'pm25_log' column is present. One of them must be present.",
                );
                return Ok(report);
            }
            TargetPresence::One(target) => debug!("Transformed target column: {}", target),
        }

        for spec in schema.columns() {
            match df.column(&spec.name) {
                Ok(column) => {
                    let series = column.as_materialized_series();
                    let stats = Self::validate_column(&spec.name, series, &spec.rule, &mut report)
                        .context(format!("Failed to check column '{}'", spec.name))?;
                    report.column_stats.push(stats);
                }
                Err(_) if spec.rule.required => Self::emit(
                    &mut report,
                    FindingKind::MissingRequiredColumn,
                    Some(&spec.name),
                    format!(
                        "Missing required column '{}' specified in the schema.",
                        spec.name
                    ),
                ),
                Err(_) if TargetColumn::is_target_column(&spec.name) => {}
                Err(_) => Self::emit(
                    &mut report,
                    FindingKind::MissingOptionalColumn,
                    Some(&spec.name),
                    format!("Optional column '{}' is missing from the dataset.", spec.name),
                ),
            }
        }

        Ok(report)
    }

    /// Run the per-column checks on a present column.
    ///
    /// Each violated check produces one warning. Observed min/max are always
    /// logged.
    pub fn validate_column(
        name: &str,
        series: &Series,
        rule: &ColumnRule,
        report: &mut ValidationReport,
    ) -> Result<ColumnStats> {
        let missing = missing_count(series)?;
        if rule.required && missing > 0 {
            Self::emit(
                report,
                FindingKind::MissingValues,
                Some(name),
                format!(
                    "Missing values found in required column '{}' ({} of {})",
                    name,
                    missing,
                    series.len()
                ),
            );
        }

        let mut stats = ColumnStats {
            name: name.to_string(),
            dtype: series.dtype().to_string(),
            missing_count: missing,
            min: None,
            max: None,
        };

        if !is_numeric_dtype(series.dtype()) {
            Self::emit(
                report,
                FindingKind::NonNumericColumn,
                Some(name),
                format!(
                    "Column '{}' has non-numeric dtype {}; numeric checks skipped",
                    name, stats.dtype
                ),
            );
            info!("{}: min = n/a, max = n/a", name);
            return Ok(stats);
        }

        let values = present_values(series)?;
        if let Some((min, max)) = min_max(&values) {
            stats.min = Some(min);
            stats.max = Some(max);
        }

        if rule.kind == DataKind::Int
            && values.iter().any(|v| v.is_finite() && v.fract() != 0.0)
        {
            Self::emit(
                report,
                FindingKind::NonIntegralValues,
                Some(name),
                format!("Column '{name}' is declared int but holds fractional values"),
            );
        }

        if rule.sign == SignConstraint::Positive && values.iter().any(|&v| v < 0.0) {
            Self::emit(
                report,
                FindingKind::NegativeValues,
                Some(name),
                format!("Negative values found in column '{name}' expected to be positive"),
            );
        }

        if let (Some(bound), Some(observed)) = (rule.min, stats.min)
            && observed < bound
        {
            Self::emit(
                report,
                FindingKind::BelowMinimum,
                Some(name),
                format!("Column '{name}' has values below expected minimum {bound}"),
            );
        }

        if let (Some(bound), Some(observed)) = (rule.max, stats.max)
            && observed > bound
        {
            Self::emit(
                report,
                FindingKind::AboveMaximum,
                Some(name),
                format!("Column '{name}' has values above expected maximum {bound}"),
            );
        }

        info!(
            "{}: min = {}, max = {}",
            name,
            format_stat(stats.min),
            format_stat(stats.max)
        );

        Ok(stats)
    }

    fn emit(
        report: &mut ValidationReport,
        kind: FindingKind,
        column: Option<&str>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        match kind.severity() {
            Severity::Error => error!("{}", message),
            Severity::Warning => warn!("{}", message),
        }
        report.record(kind, column, message);
    }
}
