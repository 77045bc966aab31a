//! ETL manager table documents.
//!
//! The ETL manager describes tables as JSON documents with its own column
//! type names (`character`, `long`, `datetime`). Every column carries an
//! explicit nullability and a description, empty when unknown.

use serde::{Deserialize, Serialize};
use typebridge_grammar::ScalarParam;

use crate::adapter::GrammarAdapter;
use crate::config::ConverterConfig;
use crate::converter::{export_column_type, import_column_type, Converted, MetadataConverter};
use crate::error::ConvertResult;
use crate::metadata::{Column, Metadata};
use crate::table::{ScalarMapping, ScalarTable};

/// One column of an ETL manager table document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlColumn {
    /// Column name.
    pub name: String,
    /// ETL manager type string.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Description; empty when unknown.
    #[serde(default)]
    pub description: String,
    /// Whether the column admits nulls; `None` when the document omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

/// An ETL manager table document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlTableMetadata {
    /// Location of the JSON schema this document conforms to.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
    /// Table name.
    pub name: String,
    /// Table description.
    #[serde(default)]
    pub description: String,
    /// Data file format.
    #[serde(default)]
    pub data_format: String,
    /// Columns in table order.
    pub columns: Vec<EtlColumn>,
    /// Partition column names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<String>,
    /// Primary-key column names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
}

impl EtlTableMetadata {
    /// Parses a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Json`](crate::ConvertError::Json) for
    /// malformed JSON.
    pub fn from_json_str(json: &str) -> ConvertResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Json`](crate::ConvertError::Json) if
    /// serialization fails.
    pub fn to_json_string(&self) -> ConvertResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Converts [`Metadata`] to and from [`EtlTableMetadata`].
#[derive(Debug, Clone)]
pub struct EtlManagerConverter {
    adapter: GrammarAdapter,
    config: ConverterConfig,
    schema_url: Option<String>,
}

impl EtlManagerConverter {
    /// Creates a converter using the built-in etl_manager adapter.
    #[must_use]
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            adapter: GrammarAdapter::etl_manager(),
            config,
            schema_url: None,
        }
    }

    /// Stamps generated documents with a `$schema` URL.
    #[must_use]
    pub fn with_schema_url(mut self, url: impl Into<String>) -> Self {
        self.schema_url = Some(url.into());
        self
    }
}

impl Default for EtlManagerConverter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

impl MetadataConverter for EtlManagerConverter {
    type Output = EtlTableMetadata;

    fn target(&self) -> &str {
        self.adapter.name()
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn generate_from_meta(&self, metadata: &Metadata) -> ConvertResult<Converted<EtlTableMetadata>> {
        metadata.validate(&self.config)?;
        let mut warnings = self.config.warning_collector();
        let mut columns = Vec::with_capacity(metadata.columns.len());
        for column in &metadata.columns {
            columns.push(EtlColumn {
                name: column.name.clone(),
                type_name: export_column_type(&self.adapter, column, &mut warnings)?,
                description: column.description.clone().unwrap_or_default(),
                nullable: Some(column.is_nullable(self.config.default_nullable)),
            });
        }
        tracing::debug!(table = %metadata.name, columns = columns.len(), "generated etl_manager table");
        Ok(Converted::new(
            EtlTableMetadata {
                schema_url: self.schema_url.clone(),
                name: metadata.name.clone(),
                description: metadata.description.clone(),
                data_format: metadata.file_format.clone(),
                columns,
                partitions: metadata.partitions.clone(),
                primary_key: metadata.primary_key.clone(),
            },
            warnings.into_warnings(),
        ))
    }

    fn generate_to_meta(&self, doc: &EtlTableMetadata) -> ConvertResult<Converted<Metadata>> {
        let mut warnings = self.config.warning_collector();
        let mut columns = Vec::with_capacity(doc.columns.len());
        for column in &doc.columns {
            columns.push(Column {
                name: column.name.clone(),
                type_name: import_column_type(
                    &self.adapter,
                    &column.name,
                    &column.type_name,
                    &mut warnings,
                )?,
                description: Some(column.description.clone()).filter(|d| !d.is_empty()),
                nullable: column.nullable,
            });
        }
        let metadata = Metadata {
            name: doc.name.clone(),
            description: doc.description.clone(),
            file_format: doc.data_format.clone(),
            sensitive: false,
            primary_key: doc.primary_key.clone(),
            partitions: doc.partitions.clone(),
            columns,
        };
        Ok(Converted::new(metadata, warnings.into_warnings()))
    }
}

/// Agnostic-to-etl_manager scalar table.
#[must_use]
pub fn export_table() -> ScalarTable {
    ScalarTable::new()
        .with("bool", ScalarMapping::exact("boolean"))
        .with("int8", ScalarMapping::lossy("int"))
        .with("int16", ScalarMapping::lossy("int"))
        .with("int32", ScalarMapping::exact("int"))
        .with("int64", ScalarMapping::exact("long"))
        .with("uint8", ScalarMapping::lossy("int"))
        .with("uint16", ScalarMapping::lossy("int"))
        .with("uint32", ScalarMapping::lossy("long"))
        .with("uint64", ScalarMapping::unsupported())
        .with("float16", ScalarMapping::lossy("float"))
        .with("float32", ScalarMapping::exact("float"))
        .with("float64", ScalarMapping::exact("double"))
        .with("decimal128", ScalarMapping::exact("decimal").keep_params())
        .with("time32", ScalarMapping::unsupported())
        .with("time64", ScalarMapping::unsupported())
        .with("timestamp(s)", ScalarMapping::exact("datetime").drop_params())
        .with("timestamp", ScalarMapping::lossy("datetime").drop_params())
        .with("date32", ScalarMapping::exact("date"))
        .with("date64", ScalarMapping::lossy("date"))
        .with("string", ScalarMapping::exact("character"))
        .with("utf8", ScalarMapping::exact("character"))
        .with("large_string", ScalarMapping::lossy("character"))
        .with("large_utf8", ScalarMapping::lossy("character"))
        .with("binary", ScalarMapping::exact("binary"))
        .with("binary()", ScalarMapping::lossy("binary").drop_params())
        .with("large_binary", ScalarMapping::lossy("binary"))
        .with("null", ScalarMapping::unsupported())
}

/// Etl_manager-to-agnostic scalar table.
#[must_use]
pub fn import_table() -> ScalarTable {
    ScalarTable::new()
        .with("character", ScalarMapping::exact("string"))
        .with("int", ScalarMapping::exact("int32"))
        .with("long", ScalarMapping::exact("int64"))
        .with("float", ScalarMapping::exact("float32"))
        .with("double", ScalarMapping::exact("float64"))
        .with("decimal()", ScalarMapping::exact("decimal128").keep_params())
        .with(
            "decimal",
            ScalarMapping::exact("decimal128")
                .fixed_params([ScalarParam::Int(10), ScalarParam::Int(0)]),
        )
        .with("date", ScalarMapping::exact("date32"))
        .with(
            "datetime",
            ScalarMapping::exact("timestamp").fixed_params([ScalarParam::from("s")]),
        )
        .with("boolean", ScalarMapping::exact("bool"))
        .with("binary", ScalarMapping::exact("binary"))
}
