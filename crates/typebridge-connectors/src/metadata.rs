//! The agnostic metadata envelope.
//!
//! [`Metadata`] describes one table: its name, columns with agnostic type
//! strings, partitioning and primary key. It is the hub every converter
//! translates from and to, and it (de)serializes as JSON:
//!
//! ```json
//! {
//!   "name": "events",
//!   "description": "raw events",
//!   "file_format": "parquet",
//!   "partitions": ["dt"],
//!   "columns": [
//!     {"name": "id", "type": "int64", "nullable": false},
//!     {"name": "dt", "type": "date32"}
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use typebridge_grammar::{parse, TypeNode};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, ConvertResult};

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Agnostic type string.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nullability; `None` defers to [`ConverterConfig::default_nullable`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl Column {
    /// Creates a column with no description and unset nullability.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            description: None,
            nullable: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the nullability.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Nullability, falling back to `default` when unset.
    #[must_use]
    pub fn is_nullable(&self, default: bool) -> bool {
        self.nullable.unwrap_or(default)
    }

    /// Parses the column's agnostic type string.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Parse`] for a malformed type string.
    pub fn parsed_type(&self) -> ConvertResult<TypeNode> {
        Ok(parse(&self.type_name)?)
    }
}

/// Agnostic description of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Table name.
    pub name: String,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Storage format of the data files (`csv`, `json`, `parquet`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_format: String,

    /// Whether the table holds sensitive data.
    #[serde(default)]
    pub sensitive: bool,

    /// Primary-key column names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,

    /// Partition column names, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<String>,

    /// Columns in table order.
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Metadata {
    /// Creates an empty table description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the file format.
    #[must_use]
    pub fn with_file_format(mut self, file_format: impl Into<String>) -> Self {
        self.file_format = file_format.into();
        self
    }

    /// Appends a column without checking for duplicates.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the partition columns.
    #[must_use]
    pub fn with_partitions<S: Into<String>>(mut self, partitions: impl IntoIterator<Item = S>) -> Self {
        self.partitions = partitions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the primary-key columns.
    #[must_use]
    pub fn with_primary_key<S: Into<String>>(mut self, key: impl IntoIterator<Item = S>) -> Self {
        self.primary_key = key.into_iter().map(Into::into).collect();
        self
    }

    /// Parses metadata from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Json`] for malformed JSON.
    pub fn from_json_str(json: &str) -> ConvertResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads metadata from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] if the file cannot be read, or
    /// [`ConvertError::Json`] for malformed JSON.
    pub fn from_path(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> ConvertResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes pretty-printed JSON to a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] or [`ConvertError::Json`].
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> ConvertResult<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in table order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether `name` is a partition column.
    #[must_use]
    pub fn is_partition(&self, name: &str) -> bool {
        self.partitions.iter().any(|p| p == name)
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidMetadata`] if a column with the same
    /// name already exists.
    pub fn add_column(&mut self, column: Column) -> ConvertResult<()> {
        if self.column(&column.name).is_some() {
            return Err(ConvertError::InvalidMetadata(format!(
                "column '{}' already exists in '{}'",
                column.name, self.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Removes a column, along with any partition or primary-key reference
    /// to it.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        self.partitions.retain(|p| p != name);
        self.primary_key.retain(|k| k != name);
        Some(self.columns.remove(idx))
    }

    /// Parses the type of the named column.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidMetadata`] for an unknown column, or a
    /// column-attributed parse error.
    pub fn parsed_type(&self, column: &str) -> ConvertResult<TypeNode> {
        let col = self.column(column).ok_or_else(|| {
            ConvertError::InvalidMetadata(format!("no column '{column}' in '{}'", self.name))
        })?;
        col.parsed_type().map_err(|e| e.in_column(column))
    }

    /// Checks the envelope is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidMetadata`] for an empty name, duplicate
    /// or dangling column references, and duplicate struct field names when
    /// `config` rejects them; column type parse errors are attributed to
    /// their column.
    pub fn validate(&self, config: &ConverterConfig) -> ConvertResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConvertError::InvalidMetadata("table name is empty".into()));
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ConvertError::InvalidMetadata(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            let node = column.parsed_type().map_err(|e| e.in_column(&column.name))?;
            if config.reject_duplicate_fields {
                if let Some(field) = node.duplicate_field_name() {
                    return Err(ConvertError::InvalidMetadata(format!(
                        "duplicate struct field '{field}'"
                    ))
                    .in_column(&column.name));
                }
            }
        }

        for (role, names) in [("partition", &self.partitions), ("primary key", &self.primary_key)] {
            if let Some(missing) = names.iter().find(|n| !seen.contains(n.as_str())) {
                return Err(ConvertError::InvalidMetadata(format!(
                    "{role} column '{missing}' is not a column of '{}'",
                    self.name
                )));
            }
        }
        Ok(())
    }
}
