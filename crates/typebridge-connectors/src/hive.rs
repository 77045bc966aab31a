//! Hive catalog conversions.
//!
//! Produces the column layout a Hive-style catalog expects: regular columns
//! in table order and partition keys split out in partition order. Type
//! names go through the `hive` [`GrammarAdapter`]. No DDL is generated.

use serde::{Deserialize, Serialize};
use typebridge_grammar::ScalarParam;

use crate::adapter::GrammarAdapter;
use crate::config::ConverterConfig;
use crate::converter::{export_column_type, import_column_type, Converted, MetadataConverter};
use crate::error::{ConvertError, ConvertResult};
use crate::metadata::{Column, Metadata};
use crate::table::{ScalarMapping, ScalarTable};
use crate::warning::WarningCollector;

/// Unit given to Hive timestamps when imported.
pub const TIMESTAMP_UNIT: &str = "ms";

/// One catalog column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HiveColumn {
    /// Column name.
    pub name: String,
    /// Hive type string.
    #[serde(rename = "Type")]
    pub type_name: String,
    /// Column comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Catalog table definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HiveTableSpec {
    /// Table name.
    pub name: String,
    /// Table description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Non-partition columns in table order.
    pub columns: Vec<HiveColumn>,
    /// Partition columns, outermost first.
    #[serde(default)]
    pub partition_keys: Vec<HiveColumn>,
}

/// Converts [`Metadata`] to and from a [`HiveTableSpec`].
#[derive(Debug, Clone)]
pub struct HiveConverter {
    adapter: GrammarAdapter,
    config: ConverterConfig,
}

impl HiveConverter {
    /// Creates a converter using the built-in hive adapter.
    #[must_use]
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_adapter(GrammarAdapter::hive(), config)
    }

    /// Creates a converter with a custom adapter.
    #[must_use]
    pub fn with_adapter(adapter: GrammarAdapter, config: ConverterConfig) -> Self {
        Self { adapter, config }
    }

    fn hive_column(
        &self,
        column: &Column,
        warnings: &mut WarningCollector,
    ) -> ConvertResult<HiveColumn> {
        Ok(HiveColumn {
            name: column.name.clone(),
            type_name: export_column_type(&self.adapter, column, warnings)?,
            comment: column.description.clone(),
        })
    }

    fn agnostic_column(
        &self,
        column: &HiveColumn,
        warnings: &mut WarningCollector,
    ) -> ConvertResult<Column> {
        Ok(Column {
            name: column.name.clone(),
            type_name: import_column_type(&self.adapter, &column.name, &column.type_name, warnings)?,
            description: column.comment.clone(),
            nullable: None,
        })
    }
}

impl Default for HiveConverter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

impl MetadataConverter for HiveConverter {
    type Output = HiveTableSpec;

    fn target(&self) -> &str {
        self.adapter.name()
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn generate_from_meta(&self, metadata: &Metadata) -> ConvertResult<Converted<HiveTableSpec>> {
        metadata.validate(&self.config)?;
        let mut warnings = self.config.warning_collector();

        let mut columns = Vec::with_capacity(metadata.columns.len());
        for column in metadata.columns.iter().filter(|c| !metadata.is_partition(&c.name)) {
            columns.push(self.hive_column(column, &mut warnings)?);
        }

        let mut partition_keys = Vec::with_capacity(metadata.partitions.len());
        for name in &metadata.partitions {
            let column = metadata.column(name).ok_or_else(|| {
                ConvertError::InvalidMetadata(format!("partition column '{name}' is not a column"))
            })?;
            partition_keys.push(self.hive_column(column, &mut warnings)?);
        }

        tracing::debug!(
            table = %metadata.name,
            columns = columns.len(),
            partitions = partition_keys.len(),
            "generated hive table spec"
        );
        Ok(Converted::new(
            HiveTableSpec {
                name: metadata.name.clone(),
                description: metadata.description.clone(),
                columns,
                partition_keys,
            },
            warnings.into_warnings(),
        ))
    }

    fn generate_to_meta(&self, spec: &HiveTableSpec) -> ConvertResult<Converted<Metadata>> {
        let mut warnings = self.config.warning_collector();
        let mut columns = Vec::with_capacity(spec.columns.len() + spec.partition_keys.len());
        for column in spec.columns.iter().chain(&spec.partition_keys) {
            columns.push(self.agnostic_column(column, &mut warnings)?);
        }
        let metadata = Metadata {
            name: spec.name.clone(),
            description: spec.description.clone(),
            partitions: spec.partition_keys.iter().map(|c| c.name.clone()).collect(),
            columns,
            ..Metadata::default()
        };
        Ok(Converted::new(metadata, warnings.into_warnings()))
    }
}

/// Agnostic-to-hive scalar table.
#[must_use]
pub fn export_table() -> ScalarTable {
    ScalarTable::new()
        .with("bool", ScalarMapping::exact("boolean"))
        .with("int8", ScalarMapping::exact("tinyint"))
        .with("int16", ScalarMapping::exact("smallint"))
        .with("int32", ScalarMapping::exact("int"))
        .with("int64", ScalarMapping::exact("bigint"))
        .with("uint8", ScalarMapping::lossy("smallint"))
        .with("uint16", ScalarMapping::lossy("int"))
        .with("uint32", ScalarMapping::lossy("bigint"))
        .with("uint64", ScalarMapping::unsupported())
        .with("float16", ScalarMapping::lossy("float"))
        .with("float32", ScalarMapping::exact("float"))
        .with("float64", ScalarMapping::exact("double"))
        .with("decimal128", ScalarMapping::exact("decimal").keep_params())
        .with("time32", ScalarMapping::unsupported())
        .with("time64", ScalarMapping::unsupported())
        .with(
            &format!("timestamp({TIMESTAMP_UNIT})"),
            ScalarMapping::exact("timestamp").drop_params(),
        )
        .with("timestamp", ScalarMapping::lossy("timestamp").drop_params())
        .with("date32", ScalarMapping::exact("date"))
        .with("date64", ScalarMapping::lossy("date"))
        .with("string", ScalarMapping::exact("string"))
        .with("utf8", ScalarMapping::exact("string"))
        .with("large_string", ScalarMapping::lossy("string"))
        .with("large_utf8", ScalarMapping::lossy("string"))
        .with("binary", ScalarMapping::exact("binary"))
        .with("binary()", ScalarMapping::lossy("binary").drop_params())
        .with("large_binary", ScalarMapping::lossy("binary"))
        .with("null", ScalarMapping::unsupported())
}

/// Hive-to-agnostic scalar table. Names match ignoring case.
#[must_use]
pub fn import_table() -> ScalarTable {
    ScalarTable::case_insensitive()
        .with("boolean", ScalarMapping::exact("bool"))
        .with("tinyint", ScalarMapping::exact("int8"))
        .with("smallint", ScalarMapping::exact("int16"))
        .with("int", ScalarMapping::exact("int32"))
        .with("integer", ScalarMapping::exact("int32"))
        .with("bigint", ScalarMapping::exact("int64"))
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
            "timestamp",
            ScalarMapping::exact("timestamp").fixed_params([ScalarParam::from(TIMESTAMP_UNIT)]),
        )
        .with("string", ScalarMapping::exact("string"))
        .with("varchar()", ScalarMapping::lossy("string").drop_params())
        .with("char()", ScalarMapping::lossy("string").drop_params())
        .with("binary", ScalarMapping::exact("binary"))
}
