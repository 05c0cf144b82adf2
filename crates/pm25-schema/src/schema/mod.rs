//! Column schemas for engineered PM2.5 feature tables.
//!
//! A [`Schema`] is an ordered list of [`ColumnSpec`]s. The built-in
//! [`pm25_feature_schema`] describes the output of the feature-engineering
//! stage: the raw target, exactly one transformed target, lag/rolling/EMA
//! features, differences and calendar encodings.

mod rules;

pub use rules::{ColumnRule, ColumnSpec, DataKind, SignConstraint, Schema};

use crate::target::TargetColumn;

/// Rolling/EMA window sizes produced by feature engineering.
const WINDOWS: [u32; 3] = [3, 6, 24];

/// Number of lag features.
const LAGS: u32 = 5;

/// The fixed schema for the engineered PM2.5 training table.
pub fn pm25_feature_schema() -> Schema {
    let positive = ColumnRule::float().required().positive();

    let mut schema = Schema::new()
        .with_column("pm25", positive)
        .with_column(TargetColumn::BoxCox.column_name(), ColumnRule::float().positive())
        .with_column(TargetColumn::Log.column_name(), ColumnRule::float().positive());

    for lag in 1..=LAGS {
        schema = schema.with_column(format!("lag_{lag}"), positive);
    }
    for prefix in ["rolling_mean", "rolling_std", "ema"] {
        for window in WINDOWS {
            schema = schema.with_column(format!("{prefix}_{window}"), positive);
        }
    }

    let cyclic = ColumnRule::float().required().bounds(-1.0, 1.0);

    schema
        .with_column("diff_1", ColumnRule::float().required())
        .with_column("diff_2", ColumnRule::float().required())
        .with_column("hour", ColumnRule::int().required().bounds(0.0, 23.0))
        .with_column("day_of_week", ColumnRule::int().required().bounds(0.0, 6.0))
        .with_column("day_of_year", ColumnRule::int().required().bounds(1.0, 365.0))
        .with_column("month", ColumnRule::int().required().bounds(1.0, 12.0))
        .with_column("sin_hour", cyclic)
        .with_column("cos_hour", cyclic)
        .with_column("sin_day_of_week", cyclic)
        .with_column("cos_day_of_week", cyclic)
}
