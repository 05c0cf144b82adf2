//! Error types for the schema checker.
//!
//! Schema violations found in a dataset are *findings* (see
//! [`crate::types::ValidationReport`]), not errors. The variants here cover
//! faults that stop a run: unreadable files, malformed schemas, store
//! failures and the like.
//!
//! Errors serialize as `{ "code", "message" }` so they can be embedded in
//! JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the schema checker.
#[derive(Error, Debug)]
pub enum CheckerError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Schema definition is malformed (duplicate columns, inverted bounds, ...).
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Dataset file format is not supported.
    #[error("Unsupported dataset format '{extension}' for {path} (expected .csv or .parquet)")]
    UnsupportedFormat { path: String, extension: String },

    /// No valid values found for a computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Two inputs that must line up do not.
    #[error("Length mismatch: {left} values vs {right} values")]
    LengthMismatch { left: usize, right: usize },

    /// Metadata store rejected an operation.
    #[error("Metadata store error: {0}")]
    MetadataStore(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error from the metadata store.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CheckerError>,
    },
}

impl CheckerError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CheckerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, preserved through context wrapping.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidSchema(_) => "INVALID_SCHEMA",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::LengthMismatch { .. } => "LENGTH_MISMATCH",
            Self::MetadataStore(_) => "METADATA_STORE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

impl Serialize for CheckerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CheckerError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CheckerError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CheckerError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CheckerError::ColumnNotFound("pm25".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            CheckerError::LengthMismatch { left: 1, right: 2 }.error_code(),
            "LENGTH_MISMATCH"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = CheckerError::ColumnNotFound("hour".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("hour"));
    }

    #[test]
    fn test_with_context() {
        let error = CheckerError::InvalidConfig("empty path".to_string())
            .with_context("While loading dataset");
        assert!(error.to_string().contains("While loading dataset"));
        assert_eq!(error.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_io_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.context("Opening schema.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().starts_with("Opening schema.json"));
    }
}
