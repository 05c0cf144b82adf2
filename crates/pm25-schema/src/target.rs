//! Transformed target columns.
//!
//! Upstream feature engineering stores the PM2.5 target under exactly one
//! variance-stabilized representation: Box-Cox or log.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transformed representation of the target a table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetColumn {
    BoxCox,
    Log,
}

/// Result of looking for the transformed target columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPresence {
    /// Exactly one transformed column is present.
    One(TargetColumn),
    /// Both transformed columns are present.
    Both,
    /// Neither transformed column is present.
    Neither,
}

impl TargetColumn {
    pub const ALL: [TargetColumn; 2] = [TargetColumn::BoxCox, TargetColumn::Log];

    /// Column name in the feature table.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::BoxCox => "pm25_boxcox",
            Self::Log => "pm25_log",
        }
    }

    /// Check whether a column name is one of the transformed target columns.
    pub fn is_target_column(name: &str) -> bool {
        Self::ALL.iter().any(|t| t.column_name() == name)
    }

    /// Inspect a table for the transformed target columns.
    pub fn detect(df: &DataFrame) -> TargetPresence {
        let has = |t: TargetColumn| df.column(t.column_name()).is_ok();
        match (has(Self::BoxCox), has(Self::Log)) {
            (true, true) => TargetPresence::Both,
            (true, false) => TargetPresence::One(Self::BoxCox),
            (false, true) => TargetPresence::One(Self::Log),
            (false, false) => TargetPresence::Neither,
        }
    }
}

impl fmt::Display for TargetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
