//! PM2.5 Feature Schema Checker
//!
//! Validates engineered PM2.5 feature tables against a column schema and
//! records the schema in a metadata store. Built on Polars.
//!
//! # Overview
//!
//! - **Schema**: ordered column rules (kind, required, sign, bounds), with a
//!   built-in schema for the PM2.5 feature-engineering output
//! - **Validation**: the transformed-target invariant (exactly one of
//!   `pm25_boxcox`/`pm25_log`) followed by per-column checks
//! - **Metadata**: a SQLite-backed lineage store for schema artifacts
//! - **Evaluation**: inverse Box-Cox/log transform and RMSE for forecasts
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pm25_schema::{SchemaChecker, pm25_feature_schema, load_dataset};
//! use std::path::Path;
//!
//! let df = load_dataset(Path::new("train.parquet"))?;
//! let report = SchemaChecker::validate(&df, &pm25_feature_schema())?;
//!
//! if report.passed {
//!     println!("{} warning(s)", report.warning_count());
//! } else {
//!     for finding in report.errors() {
//!         println!("{}", finding.message);
//!     }
//! }
//! ```
//!
//! # Recording the schema
//!
//! ```rust,ignore
//! use pm25_schema::metadata::{SqliteMetadataStore, log_schema};
//!
//! let mut store = SqliteMetadataStore::open(Path::new("mlmd_metadata.db"))?;
//! let record = log_schema(&mut store, &pm25_feature_schema(), Path::new("schema.json"))?;
//! println!("artifact {} -> {}", record.artifact_id, record.uri);
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod loader;
pub mod logging;
pub mod metadata;
pub mod runner;
pub mod schema;
pub mod target;
pub mod types;
pub mod utils;
pub mod validation;

// Re-exports for convenient access
pub use config::{CheckerConfig, CheckerConfigBuilder, ConfigValidationError};
pub use error::{CheckerError, Result as CheckerResult, ResultExt};
pub use evaluation::{
    EvaluationSummary, TargetTransform, evaluate_predictions, rmse, transform_mismatch,
};
pub use loader::{DatasetFormat, load_dataset};
pub use metadata::{
    Artifact, MetadataStore, SchemaRecord, SqliteMetadataStore, log_schema,
};
pub use runner::{CheckOutcome, run_check, run_check_with_store};
pub use schema::{ColumnRule, ColumnSpec, DataKind, Schema, SignConstraint, pm25_feature_schema};
pub use target::{TargetColumn, TargetPresence};
pub use types::{ColumnStats, Finding, FindingKind, Severity, ValidationReport};
pub use validation::SchemaChecker;
