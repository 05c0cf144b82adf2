//! Dataset loading.
//!
//! Feature tables are read with polars from CSV or Parquet, chosen by file
//! extension.

use crate::error::{CheckerError, Result, ResultExt};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// On-disk formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    /// Pick a format from the path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" | "pq" => Ok(Self::Parquet),
            _ => Err(CheckerError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            }),
        }
    }
}

/// Load a dataset into memory.
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    let format = DatasetFormat::from_path(path)?;
    info!("Loading dataset from: {}", path.display());

    let df = match format {
        DatasetFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish(),
        DatasetFormat::Parquet => {
            let file =
                File::open(path).context(format!("Failed to open {}", path.display()))?;
            ParquetReader::new(file).finish()
        }
    }
    .context(format!("Failed to read {}", path.display()))?;

    info!("Dataset loaded successfully: {:?}", df.shape());
    Ok(df)
}
