use crate::error::{CheckerError, Result};
use chrono::Utc;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Type (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255) NOT NULL UNIQUE,
    type_kind TINYINT(1) NOT NULL
);
CREATE TABLE IF NOT EXISTS Artifact (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_id INT NOT NULL REFERENCES Type(id),
    uri TEXT,
    state INT,
    create_time_since_epoch INT NOT NULL,
    last_update_time_since_epoch INT NOT NULL
);
CREATE TABLE IF NOT EXISTS ArtifactProperty (
    artifact_id INT NOT NULL REFERENCES Artifact(id),
    name VARCHAR(255) NOT NULL,
    int_value INT,
    double_value DOUBLE,
    string_value TEXT,
    PRIMARY KEY (artifact_id, name)
);
CREATE INDEX IF NOT EXISTS idx_artifact_type ON Artifact(type_id);
"#;

/// `Type.type_kind` value for artifact types.
const ARTIFACT_TYPE_KIND: i64 = 1;

/// Lifecycle state of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArtifactState {
    #[default]
    Unknown,
    Pending,
    Live,
    MarkedForDeletion,
    Deleted,
}

impl ArtifactState {
    fn as_i64(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Pending => 1,
            Self::Live => 2,
            Self::MarkedForDeletion => 3,
            Self::Deleted => 4,
        }
    }

    fn from_i64(value: i64) -> Self {
        match value {
            1 => Self::Pending,
            2 => Self::Live,
            3 => Self::MarkedForDeletion,
            4 => Self::Deleted,
            _ => Self::Unknown,
        }
    }
}

/// Typed property value attached to an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Double(f64),
    String(String),
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// An artifact record.
///
/// `id` is `None` for artifacts not yet stored; [`MetadataStore::put_artifact`]
/// inserts those and updates artifacts that already carry an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Option<i64>,
    pub type_id: i64,
    pub uri: String,
    pub state: ArtifactState,
    pub properties: BTreeMap<String, PropertyValue>,
    pub create_time_since_epoch: i64,
    pub last_update_time_since_epoch: i64,
}

impl Artifact {
    pub fn new(type_id: i64, uri: impl Into<String>) -> Self {
        Self {
            id: None,
            type_id,
            uri: uri.into(),
            state: ArtifactState::Live,
            properties: BTreeMap::new(),
            create_time_since_epoch: 0,
            last_update_time_since_epoch: 0,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Lineage store for artifact types and artifacts.
pub trait MetadataStore {
    /// Register an artifact type, returning its id. Registering an existing
    /// name returns the existing id.
    fn put_artifact_type(&mut self, name: &str) -> Result<i64>;

    /// Insert or update an artifact, returning its id.
    fn put_artifact(&mut self, artifact: &Artifact) -> Result<i64>;

    /// All artifacts of the named type, oldest first. Unknown types yield an
    /// empty list.
    fn get_artifacts_by_type(&self, type_name: &str) -> Result<Vec<Artifact>>;
}

/// SQLite-backed [`MetadataStore`].
pub struct SqliteMetadataStore {
    conn: Connection,
}

static_assertions::assert_impl_all!(SqliteMetadataStore: Send);

impl SqliteMetadataStore {
    /// Open a store file read-write, creating it if it does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        debug!("Opened metadata store at {}", path.display());
        Self::init(conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    fn type_id(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM Type WHERE name = ?1 AND type_kind = ?2",
                params![name, ARTIFACT_TYPE_KIND],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn load_properties(&self, artifact_id: i64) -> Result<BTreeMap<String, PropertyValue>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, int_value, double_value, string_value \
             FROM ArtifactProperty WHERE artifact_id = ?1",
        )?;
        let rows = stmt.query_map(params![artifact_id], |row| {
            let name: String = row.get(0)?;
            let int_value: Option<i64> = row.get(1)?;
            let double_value: Option<f64> = row.get(2)?;
            let string_value: Option<String> = row.get(3)?;
            Ok((name, int_value, double_value, string_value))
        })?;

        let mut properties = BTreeMap::new();
        for row in rows {
            let (name, int_value, double_value, string_value) = row?;
            let value = match (int_value, double_value, string_value) {
                (Some(i), _, _) => PropertyValue::Int(i),
                (None, Some(d), _) => PropertyValue::Double(d),
                (None, None, Some(s)) => PropertyValue::String(s),
                (None, None, None) => continue,
            };
            properties.insert(name, value);
        }
        Ok(properties)
    }
}

impl MetadataStore for SqliteMetadataStore {
    fn put_artifact_type(&mut self, name: &str) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(CheckerError::MetadataStore(
                "artifact type name must not be empty".to_string(),
            ));
        }
        if let Some(id) = self.type_id(name)? {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO Type (name, type_kind) VALUES (?1, ?2)",
            params![name, ARTIFACT_TYPE_KIND],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Registered artifact type '{}' with id {}", name, id);
        Ok(id)
    }

    fn put_artifact(&mut self, artifact: &Artifact) -> Result<i64> {
        let now = Utc::now().timestamp_millis();
        let tx = self.conn.transaction()?;

        let known_type: Option<i64> = tx
            .query_row(
                "SELECT id FROM Type WHERE id = ?1",
                params![artifact.type_id],
                |row| row.get(0),
            )
            .optional()?;
        if known_type.is_none() {
            return Err(CheckerError::MetadataStore(format!(
                "unknown artifact type id {}",
                artifact.type_id
            )));
        }

        let id = match artifact.id {
            Some(id) => {
                let updated = tx.execute(
                    "UPDATE Artifact SET type_id = ?1, uri = ?2, state = ?3, \
                     last_update_time_since_epoch = ?4 WHERE id = ?5",
                    params![artifact.type_id, artifact.uri, artifact.state.as_i64(), now, id],
                )?;
                if updated == 0 {
                    return Err(CheckerError::MetadataStore(format!(
                        "artifact {id} does not exist"
                    )));
                }
                tx.execute(
                    "DELETE FROM ArtifactProperty WHERE artifact_id = ?1",
                    params![id],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO Artifact (type_id, uri, state, create_time_since_epoch, \
                     last_update_time_since_epoch) VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![artifact.type_id, artifact.uri, artifact.state.as_i64(), now],
                )?;
                tx.last_insert_rowid()
            }
        };

        for (name, value) in &artifact.properties {
            let (int_value, double_value, string_value) = match value {
                PropertyValue::Int(i) => (Some(*i), None, None),
                PropertyValue::Double(d) => (None, Some(*d), None),
                PropertyValue::String(s) => (None, None, Some(s.as_str())),
            };
            tx.execute(
                "INSERT INTO ArtifactProperty (artifact_id, name, int_value, double_value, \
                 string_value) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, name, int_value, double_value, string_value],
            )?;
        }

        tx.commit()?;
        Ok(id)
    }

    fn get_artifacts_by_type(&self, type_name: &str) -> Result<Vec<Artifact>> {
        let Some(type_id) = self.type_id(type_name)? else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, uri, state, create_time_since_epoch, last_update_time_since_epoch \
             FROM Artifact WHERE type_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![type_id], |row| {
                Ok(Artifact {
                    id: Some(row.get(0)?),
                    type_id,
                    uri: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    state: ArtifactState::from_i64(row.get::<_, Option<i64>>(2)?.unwrap_or(0)),
                    properties: BTreeMap::new(),
                    create_time_since_epoch: row.get(3)?,
                    last_update_time_since_epoch: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|mut artifact| {
                if let Some(id) = artifact.id {
                    artifact.properties = self.load_properties(id)?;
                }
                Ok(artifact)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_artifact_type_is_idempotent() {
        let mut store = SqliteMetadataStore::open_in_memory().unwrap();
        let first = store.put_artifact_type("DataSchema").unwrap();
        let second = store.put_artifact_type("DataSchema").unwrap();
        let other = store.put_artifact_type("Model").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_empty_type_name_rejected() {
        let mut store = SqliteMetadataStore::open_in_memory().unwrap();
        let err = store.put_artifact_type("  ").unwrap_err();
        assert_eq!(err.error_code(), "METADATA_STORE_ERROR");
    }

    #[test]
    fn test_put_and_get_artifact() {
        let mut store = SqliteMetadataStore::open_in_memory().unwrap();
        let type_id = store.put_artifact_type("DataSchema").unwrap();

        let artifact = Artifact::new(type_id, "schema.json")
            .with_property("column_count", 27i64)
            .with_property("format", "json")
            .with_property("version", 1.5);
        let id = store.put_artifact(&artifact).unwrap();

        let stored = store.get_artifacts_by_type("DataSchema").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, Some(id));
        assert_eq!(stored[0].uri, "schema.json");
        assert_eq!(stored[0].state, ArtifactState::Live);
        assert_eq!(stored[0].properties["column_count"], PropertyValue::Int(27));
        assert_eq!(
            stored[0].properties["format"],
            PropertyValue::String("json".to_string())
        );
        assert_eq!(stored[0].properties["version"], PropertyValue::Double(1.5));
        assert!(stored[0].create_time_since_epoch > 0);
    }

    #[test]
    fn test_update_existing_artifact() {
        let mut store = SqliteMetadataStore::open_in_memory().unwrap();
        let type_id = store.put_artifact_type("DataSchema").unwrap();
        let id = store
            .put_artifact(&Artifact::new(type_id, "old.json").with_property("a", 1i64))
            .unwrap();

        let mut artifact = Artifact::new(type_id, "new.json").with_property("b", 2i64);
        artifact.id = Some(id);
        assert_eq!(store.put_artifact(&artifact).unwrap(), id);

        let stored = store.get_artifacts_by_type("DataSchema").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].uri, "new.json");
        assert!(!stored[0].properties.contains_key("a"));
        assert_eq!(stored[0].properties["b"], PropertyValue::Int(2));
    }

    #[test]
    fn test_unknown_type_id_rejected() {
        let mut store = SqliteMetadataStore::open_in_memory().unwrap();
        let err = store.put_artifact(&Artifact::new(42, "x")).unwrap_err();
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_unknown_type_name_yields_empty() {
        let store = SqliteMetadataStore::open_in_memory().unwrap();
        assert!(store.get_artifacts_by_type("Nope").unwrap().is_empty());
    }
}
