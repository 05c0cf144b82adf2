//! End-to-end schema check: load, record, validate, report.

use crate::config::CheckerConfig;
use crate::error::{CheckerError, Result, ResultExt};
use crate::loader::load_dataset;
use crate::metadata::{MetadataStore, SchemaRecord, SqliteMetadataStore, log_schema};
use crate::schema::{Schema, pm25_feature_schema};
use crate::types::ValidationReport;
use crate::validation::SchemaChecker;
use serde::Serialize;
use std::fs;
use tracing::info;

/// Everything a check run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub report: ValidationReport,
    /// Present when the schema was recorded in a metadata store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_record: Option<SchemaRecord>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.report.passed
    }
}

/// Resolve the schema a run validates against.
pub fn resolve_schema(config: &CheckerConfig) -> Result<Schema> {
    match &config.schema_path {
        Some(path) => {
            info!("Using schema from {}", path.display());
            Schema::from_json_file(path)
        }
        None => Ok(pm25_feature_schema()),
    }
}

/// Run a check, opening the metadata store named in the config when
/// recording is enabled.
pub fn run_check(config: &CheckerConfig) -> Result<CheckOutcome> {
    if config.record_metadata {
        let mut store = SqliteMetadataStore::open(&config.metadata_db_path).context(format!(
            "Failed to open metadata store {}",
            config.metadata_db_path.display()
        ))?;
        run_check_with_store(config, Some(&mut store))
    } else {
        run_check_with_store(config, None)
    }
}

/// Run a check against an explicitly provided store.
///
/// The schema is recorded before validation, so a record exists even when
/// the dataset fails.
pub fn run_check_with_store(
    config: &CheckerConfig,
    store: Option<&mut dyn MetadataStore>,
) -> Result<CheckOutcome> {
    config
        .validate()
        .map_err(|e| CheckerError::InvalidConfig(e.to_string()))?;

    let schema = resolve_schema(config)?;
    let df = load_dataset(&config.dataset_path)?;

    let schema_record = match store {
        Some(store) => Some(log_schema(store, &schema, &config.schema_output_path)?),
        None => None,
    };

    let report = SchemaChecker::validate(&df, &schema)?;
    if report.passed {
        info!("Data validation passed.");
    } else {
        info!("Data validation failed.");
    }
    info!(
        "{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );

    if let Some(path) = &config.report_path {
        write_report(&report, path)?;
    }

    Ok(CheckOutcome {
        report,
        schema_record,
    })
}

/// Write a validation report as pretty JSON.
pub fn write_report(report: &ValidationReport, path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)
        .context(format!("Failed to write report {}", path.display()))?;
    info!("Report saved: {}", path.display());
    Ok(())
}
