use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Both `pm25_boxcox` and `pm25_log` are present.
    BothTargetColumns,
    /// Neither `pm25_boxcox` nor `pm25_log` is present.
    NoTargetColumn,
    MissingRequiredColumn,
    MissingOptionalColumn,
    MissingValues,
    NegativeValues,
    BelowMinimum,
    AboveMaximum,
    /// Column dtype is not numeric, so numeric rules were skipped.
    NonNumericColumn,
    /// Integer column holds fractional values.
    NonIntegralValues,
}

impl FindingKind {
    /// Errors flip the overall outcome; everything else is advisory.
    pub fn severity(&self) -> Severity {
        match self {
            Self::BothTargetColumns | Self::NoTargetColumn | Self::MissingRequiredColumn => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

/// Observed statistics for a column that was present in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub name: String,
    pub dtype: String,
    /// Null plus NaN count.
    pub missing_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Outcome of validating a dataset against a schema.
///
/// `passed` is false only when a required column is absent or the
/// transformed-target invariant is broken. Warnings never affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub rows: usize,
    pub findings: Vec<Finding>,
    pub column_stats: Vec<ColumnStats>,
}

static_assertions::assert_impl_all!(ValidationReport: Send, Sync);

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            passed: true,
            rows: 0,
            findings: Vec::new(),
            column_stats: Vec::new(),
        }
    }
}

impl ValidationReport {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Record a finding. Error-severity findings mark the report as failed.
    pub fn record(&mut self, kind: FindingKind, column: Option<&str>, message: impl Into<String>) {
        let severity = kind.severity();
        if severity == Severity::Error {
            self.passed = false;
        }
        self.findings.push(Finding {
            kind,
            severity,
            column: column.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Findings of one kind.
    pub fn findings_of(&self, kind: FindingKind) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.kind == kind).collect()
    }

    /// Findings attached to one column.
    pub fn findings_for(&self, column: &str) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.column.as_deref() == Some(column))
            .collect()
    }

    pub fn stats_for(&self, column: &str) -> Option<&ColumnStats> {
        self.column_stats.iter().find(|s| s.name == column)
    }
}
