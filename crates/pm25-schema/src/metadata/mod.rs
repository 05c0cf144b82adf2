//! Metadata (lineage) recording.
//!
//! The checker records the schema it validated against as a `DataSchema`
//! artifact. The schema is written to disk first, so the artifact URI always
//! names a file that exists.

mod store;

pub use store::{Artifact, ArtifactState, MetadataStore, PropertyValue, SqliteMetadataStore};

use crate::error::{Result, ResultExt};
use crate::schema::Schema;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Artifact type name under which schemas are recorded.
pub const SCHEMA_ARTIFACT_TYPE: &str = "DataSchema";

/// Identifiers generated by the store for a recorded schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRecord {
    pub type_id: i64,
    pub artifact_id: i64,
    pub uri: String,
}

/// Write `schema` to `path` as JSON and record it in `store`.
pub fn log_schema<S: MetadataStore + ?Sized>(
    store: &mut S,
    schema: &Schema,
    path: &Path,
) -> Result<SchemaRecord> {
    schema.write_json(path)?;
    let uri = path
        .canonicalize()
        .context(format!("Failed to resolve {}", path.display()))?
        .display()
        .to_string();

    let type_id = store.put_artifact_type(SCHEMA_ARTIFACT_TYPE)?;
    let artifact = Artifact::new(type_id, uri.clone())
        .with_property("column_count", schema.len() as i64)
        .with_property("required_count", schema.required_count() as i64);
    let artifact_id = store.put_artifact(&artifact)?;

    info!("Schema logged to metadata store: {}", uri);
    Ok(SchemaRecord {
        type_id,
        artifact_id,
        uri,
    })
}
