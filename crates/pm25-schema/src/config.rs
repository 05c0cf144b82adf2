//! Configuration for a schema-check run.
//!
//! Built with [`CheckerConfig::builder()`]; the CLI maps its flags onto the
//! builder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the engineered training table.
pub const DEFAULT_DATASET_PATH: &str =
    "DataPreprocessing/src/data_store_pkl_files/train_data/feature_eng_train_data.parquet";

/// Default file the schema is written to before it is recorded.
pub const DEFAULT_SCHEMA_OUTPUT: &str = "schema.json";

/// Default metadata store database.
pub const DEFAULT_METADATA_DB: &str = "mlmd_metadata.db";

/// Configuration for a schema-check run.
///
/// # Example
///
/// ```rust,ignore
/// use pm25_schema::config::CheckerConfig;
///
/// let config = CheckerConfig::builder()
///     .dataset_path("data/train.parquet")
///     .record_metadata(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Dataset to validate (.csv or .parquet).
    pub dataset_path: PathBuf,

    /// Custom schema JSON. When None, the built-in PM2.5 feature schema is used.
    pub schema_path: Option<PathBuf>,

    /// Where the schema JSON is written before being recorded.
    /// Default: "schema.json"
    pub schema_output_path: PathBuf,

    /// SQLite metadata store file.
    /// Default: "mlmd_metadata.db"
    pub metadata_db_path: PathBuf,

    /// Whether to write the schema artifact to the metadata store.
    /// Default: true
    pub record_metadata: bool,

    /// Optional path for a JSON validation report.
    /// Default: None
    pub report_path: Option<PathBuf>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            schema_path: None,
            schema_output_path: PathBuf::from(DEFAULT_SCHEMA_OUTPUT),
            metadata_db_path: PathBuf::from(DEFAULT_METADATA_DB),
            record_metadata: true,
            report_path: None,
        }
    }
}

impl CheckerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CheckerConfigBuilder {
        CheckerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let paths = [
            ("dataset_path", &self.dataset_path),
            ("schema_output_path", &self.schema_output_path),
            ("metadata_db_path", &self.metadata_db_path),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath(field.to_string()));
            }
        }

        for (field, path) in [
            ("schema_output_path", Some(&self.schema_output_path)),
            ("schema_path", self.schema_path.as_ref()),
            ("report_path", self.report_path.as_ref()),
        ] {
            if let Some(path) = path
                && path.extension().and_then(|e| e.to_str()) != Some("json")
            {
                return Err(ConfigValidationError::NotJson {
                    field: field.to_string(),
                    path: path.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Path for '{0}' must not be empty")]
    EmptyPath(String),

    #[error("Path for '{field}' must end in .json: {}", .path.display())]
    NotJson { field: String, path: PathBuf },
}

/// Builder for [`CheckerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CheckerConfigBuilder {
    dataset_path: Option<PathBuf>,
    schema_path: Option<PathBuf>,
    schema_output_path: Option<PathBuf>,
    metadata_db_path: Option<PathBuf>,
    record_metadata: Option<bool>,
    report_path: Option<PathBuf>,
}

impl CheckerConfigBuilder {
    /// Set the dataset to validate.
    pub fn dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(path.into());
        self
    }

    /// Use a custom schema JSON instead of the built-in schema.
    pub fn schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Set where the schema JSON is written.
    pub fn schema_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_output_path = Some(path.into());
        self
    }

    /// Set the metadata store database file.
    pub fn metadata_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_db_path = Some(path.into());
        self
    }

    /// Enable or disable metadata recording.
    pub fn record_metadata(mut self, record: bool) -> Self {
        self.record_metadata = Some(record);
        self
    }

    /// Write a JSON validation report to this path.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CheckerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CheckerConfig, ConfigValidationError> {
        let config = CheckerConfig {
            dataset_path: self
                .dataset_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
            schema_path: self.schema_path,
            schema_output_path: self
                .schema_output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_OUTPUT)),
            metadata_db_path: self
                .metadata_db_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_DB)),
            record_metadata: self.record_metadata.unwrap_or(true),
            report_path: self.report_path,
        };

        config.validate()?;
        Ok(config)
    }
}
