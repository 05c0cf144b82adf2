//! Column rule records and the ordered schema that holds them.

use crate::error::{CheckerError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Expected storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Any numeric dtype is accepted
    #[default]
    Float,
    /// Numeric dtype holding whole numbers only
    Int,
}

/// Sign constraint on a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignConstraint {
    /// Values must be >= 0
    Positive,
    /// No sign restriction
    #[default]
    Unrestricted,
}

/// Rule record for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ColumnRule {
    /// Expected storage kind.
    #[serde(rename = "type", default)]
    pub kind: DataKind,

    /// Whether the column must be present and free of missing values.
    #[serde(default)]
    pub required: bool,

    /// Sign constraint on values.
    #[serde(default)]
    pub sign: SignConstraint,

    /// Inclusive lower bound, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Inclusive upper bound, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ColumnRule {
    /// Optional float column with no constraints.
    pub fn float() -> Self {
        Self::default()
    }

    /// Optional integer column with no constraints.
    pub fn int() -> Self {
        Self {
            kind: DataKind::Int,
            ..Self::default()
        }
    }

    /// Mark the column as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Expect non-negative values.
    pub fn positive(mut self) -> Self {
        self.sign = SignConstraint::Positive;
        self
    }

    /// Set inclusive bounds.
    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// A named column rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(flatten)]
    pub rule: ColumnRule,
}

/// Ordered mapping from column name to rule.
///
/// Order is significant: the checker evaluates and logs columns in the order
/// they were declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column rule. Builder style, used for static schemas.
    pub fn with_column(mut self, name: impl Into<String>, rule: ColumnRule) -> Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            rule,
        });
        self
    }

    /// All column specs in declaration order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Look up the rule for a column.
    pub fn get(&self, name: &str) -> Option<&ColumnRule> {
        self.columns
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| &spec.rule)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of required columns.
    pub fn required_count(&self) -> usize {
        self.columns.iter().filter(|spec| spec.rule.required).count()
    }

    /// Check the schema itself for structural problems.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.columns {
            if spec.name.trim().is_empty() {
                return Err(CheckerError::InvalidSchema(
                    "column name must not be empty".to_string(),
                ));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(CheckerError::InvalidSchema(format!(
                    "column '{}' is declared more than once",
                    spec.name
                )));
            }
            let bounds = [spec.rule.min, spec.rule.max];
            if bounds.iter().flatten().any(|b| !b.is_finite()) {
                return Err(CheckerError::InvalidSchema(format!(
                    "column '{}' has a non-finite bound",
                    spec.name
                )));
            }
            if let (Some(min), Some(max)) = (spec.rule.min, spec.rule.max)
                && min > max
            {
                return Err(CheckerError::InvalidSchema(format!(
                    "column '{}' has min {} greater than max {}",
                    spec.name, min, max
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a schema from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Read and validate a schema from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read schema file {}", path.display()))?;
        Self::from_json_str(&content).context(format!("Failed to parse {}", path.display()))
    }

    /// Pretty JSON representation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the schema as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json_pretty()?)
            .context(format!("Failed to write schema file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_builders() {
        let rule = ColumnRule::int().required().bounds(0.0, 23.0);
        assert_eq!(rule.kind, DataKind::Int);
        assert!(rule.required);
        assert_eq!(rule.sign, SignConstraint::Unrestricted);
        assert_eq!(rule.min, Some(0.0));
        assert_eq!(rule.max, Some(23.0));

        let rule = ColumnRule::float().positive();
        assert!(!rule.required);
        assert_eq!(rule.sign, SignConstraint::Positive);
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema = Schema::new()
            .with_column("b", ColumnRule::float())
            .with_column("a", ColumnRule::float().required());
        let names: Vec<_> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(schema.required_count(), 1);
        assert!(schema.get("a").unwrap().required);
        assert!(schema.get("c").is_none());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let schema = Schema::new()
            .with_column("hour", ColumnRule::int())
            .with_column("hour", ColumnRule::float());
        let err = schema.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SCHEMA");
        assert!(err.to_string().contains("hour"));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let schema = Schema::new().with_column("month", ColumnRule::int().bounds(12.0, 1.0));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "columns": [
                { "name": "pm25", "type": "float", "required": true, "sign": "positive" },
                { "name": "hour", "type": "int", "min": 0, "max": 23 }
            ]
        }"#;
        let schema = Schema::from_json_str(json).unwrap();
        assert_eq!(schema.len(), 2);

        let hour = schema.get("hour").unwrap();
        assert_eq!(hour.kind, DataKind::Int);
        assert!(!hour.required);
        assert_eq!(hour.sign, SignConstraint::Unrestricted);
        assert_eq!(hour.max, Some(23.0));
    }

    #[test]
    fn test_json_omits_missing_bounds() {
        let schema = Schema::new().with_column("pm25", ColumnRule::float().required().positive());
        let json = schema.to_json_pretty().unwrap();
        assert!(json.contains("\"positive\""));
        assert!(!json.contains("\"min\""));
        assert_eq!(Schema::from_json_str(&json).unwrap(), schema);
    }
}
