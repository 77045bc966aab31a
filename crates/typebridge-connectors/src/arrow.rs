//! Arrow conversions.
//!
//! Two routes into the columnar format:
//!
//! - native: agnostic type strings become [`arrow_schema::DataType`] values
//!   through [`DataTypeAssembler`], and whole [`Metadata`] becomes a
//!   [`Schema`]
//! - textual: the `arrow` [`GrammarAdapter`](crate::GrammarAdapter) tables
//!   below, for type strings such as `list<item: timestamp[ms]>`
//!
//! Every agnostic scalar has an exact native counterpart. The reverse
//! direction loses timezones and rejects native types the agnostic grammar
//! has no name for (dictionaries, maps, unions, intervals, views).

use std::collections::HashMap;
use std::sync::Arc;

use arrow_schema::{
    DataType, Field, Schema, TimeUnit, DECIMAL128_MAX_PRECISION, DECIMAL128_MAX_SCALE,
};
use typebridge_grammar::{convert, parse, Assembler, ListVariant, Scalar, ScalarParam, TypeNode};

use crate::config::ConverterConfig;
use crate::converter::{Converted, MetadataConverter};
use crate::error::{ConvertError, ConvertResult};
use crate::metadata::{Column, Metadata};
use crate::table::{ScalarMapping, ScalarTable};
use crate::warning::WarningCollector;

/// Name used for errors and warnings raised by native conversion.
pub const TARGET: &str = "arrow";

/// Name of the element field inside list types.
pub const LIST_ITEM: &str = "item";

/// Field and schema metadata key holding a description.
pub const DESCRIPTION_KEY: &str = "description";

/// Schema metadata key holding the table name.
pub const NAME_KEY: &str = "name";

/// Builds native [`DataType`]s from converted children.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataTypeAssembler;

impl Assembler for DataTypeAssembler {
    type Output = DataType;
    type Error = ConvertError;

    fn list(&mut self, variant: ListVariant, element: DataType) -> ConvertResult<DataType> {
        let field = Arc::new(Field::new(LIST_ITEM, element, true));
        Ok(match variant {
            ListVariant::List => DataType::List(field),
            ListVariant::LargeList => DataType::LargeList(field),
        })
    }

    fn structure(&mut self, fields: Vec<(String, DataType)>) -> ConvertResult<DataType> {
        Ok(DataType::Struct(
            fields
                .into_iter()
                .map(|(name, data_type)| Field::new(name, data_type, true))
                .collect(),
        ))
    }
}

/// Parses an agnostic type string into a native [`DataType`].
///
/// # Errors
///
/// Returns a parse error, or the first scalar conversion error.
pub fn agnostic_to_arrow(type_str: &str) -> ConvertResult<DataType> {
    node_to_arrow(&parse(type_str)?)
}

/// Converts an agnostic tree into a native [`DataType`].
///
/// # Errors
///
/// Returns the first scalar conversion error.
pub fn node_to_arrow(node: &TypeNode) -> ConvertResult<DataType> {
    convert(node, &mut scalar_to_arrow, &mut DataTypeAssembler)
}

/// Converts one agnostic scalar into a native [`DataType`].
///
/// # Errors
///
/// Returns [`ConvertError::UnsupportedType`] for unknown names and
/// [`ConvertError::InvalidParameters`] for malformed parameter lists.
pub fn scalar_to_arrow(scalar: &Scalar) -> ConvertResult<DataType> {
    let plain = |data_type: DataType| {
        if scalar.has_params() {
            Err(ConvertError::invalid_params(scalar.to_string(), "takes no parameters"))
        } else {
            Ok(data_type)
        }
    };
    match scalar.name.as_str() {
        "null" => plain(DataType::Null),
        "bool" => plain(DataType::Boolean),
        "int8" => plain(DataType::Int8),
        "int16" => plain(DataType::Int16),
        "int32" => plain(DataType::Int32),
        "int64" => plain(DataType::Int64),
        "uint8" => plain(DataType::UInt8),
        "uint16" => plain(DataType::UInt16),
        "uint32" => plain(DataType::UInt32),
        "uint64" => plain(DataType::UInt64),
        "float16" => plain(DataType::Float16),
        "float32" => plain(DataType::Float32),
        "float64" => plain(DataType::Float64),
        "decimal128" => decimal128(scalar),
        "time32" => Ok(DataType::Time32(time_unit(scalar, &["s", "ms"])?)),
        "time64" => Ok(DataType::Time64(time_unit(scalar, &["us", "ns"])?)),
        "timestamp" => Ok(DataType::Timestamp(
            time_unit(scalar, &["s", "ms", "us", "ns"])?,
            None,
        )),
        "date32" => plain(DataType::Date32),
        "date64" => plain(DataType::Date64),
        "string" | "utf8" => plain(DataType::Utf8),
        "large_string" | "large_utf8" => plain(DataType::LargeUtf8),
        "binary" if scalar.has_params() => fixed_size_binary(scalar),
        "binary" => Ok(DataType::Binary),
        "large_binary" => plain(DataType::LargeBinary),
        _ => Err(ConvertError::unsupported(scalar.to_string(), TARGET)),
    }
}

fn decimal128(scalar: &Scalar) -> ConvertResult<DataType> {
    let invalid = |message: String| ConvertError::invalid_params(scalar.to_string(), message);
    let [ScalarParam::Int(precision), ScalarParam::Int(scale)] = scalar.params.as_slice() else {
        return Err(invalid("expected (precision, scale)".into()));
    };
    let precision = u8::try_from(*precision)
        .ok()
        .filter(|p| (1..=DECIMAL128_MAX_PRECISION).contains(p))
        .ok_or_else(|| {
            invalid(format!(
                "precision must be between 1 and {DECIMAL128_MAX_PRECISION}"
            ))
        })?;
    let scale = i8::try_from(*scale)
        .ok()
        .filter(|s| s.unsigned_abs() <= DECIMAL128_MAX_SCALE.unsigned_abs())
        .ok_or_else(|| invalid(format!("scale must be within ±{DECIMAL128_MAX_SCALE}")))?;
    Ok(DataType::Decimal128(precision, scale))
}

fn fixed_size_binary(scalar: &Scalar) -> ConvertResult<DataType> {
    match scalar.params.as_slice() {
        [ScalarParam::Int(width)] => i32::try_from(*width)
            .ok()
            .filter(|w| *w > 0)
            .map(DataType::FixedSizeBinary)
            .ok_or_else(|| {
                ConvertError::invalid_params(scalar.to_string(), "width must be a positive i32")
            }),
        _ => Err(ConvertError::invalid_params(
            scalar.to_string(),
            "expected a single byte width",
        )),
    }
}

fn time_unit(scalar: &Scalar, allowed: &[&str]) -> ConvertResult<TimeUnit> {
    let [ScalarParam::Str(unit)] = scalar.params.as_slice() else {
        return Err(ConvertError::invalid_params(
            scalar.to_string(),
            "expected a single time unit",
        ));
    };
    if !allowed.contains(&unit.as_str()) {
        return Err(ConvertError::invalid_params(
            scalar.to_string(),
            format!("unit must be one of {}", allowed.join(", ")),
        ));
    }
    Ok(match unit.as_str() {
        "s" => TimeUnit::Second,
        "ms" => TimeUnit::Millisecond,
        "us" => TimeUnit::Microsecond,
        _ => TimeUnit::Nanosecond,
    })
}

fn unit_code(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}

fn with_unit(name: &str, unit: TimeUnit) -> TypeNode {
    TypeNode::Scalar(Scalar::new(name).with_params([ScalarParam::from(unit_code(unit))]))
}

/// Converts a native [`DataType`] into an agnostic tree.
///
/// Timezones on timestamps are dropped with a lossy-conversion warning.
///
/// # Errors
///
/// Returns [`ConvertError::UnsupportedType`] for native types without an
/// agnostic name.
pub fn arrow_to_node(
    data_type: &DataType,
    warnings: &mut WarningCollector,
) -> ConvertResult<TypeNode> {
    let node = match data_type {
        DataType::Null => TypeNode::scalar("null"),
        DataType::Boolean => TypeNode::scalar("bool"),
        DataType::Int8 => TypeNode::scalar("int8"),
        DataType::Int16 => TypeNode::scalar("int16"),
        DataType::Int32 => TypeNode::scalar("int32"),
        DataType::Int64 => TypeNode::scalar("int64"),
        DataType::UInt8 => TypeNode::scalar("uint8"),
        DataType::UInt16 => TypeNode::scalar("uint16"),
        DataType::UInt32 => TypeNode::scalar("uint32"),
        DataType::UInt64 => TypeNode::scalar("uint64"),
        DataType::Float16 => TypeNode::scalar("float16"),
        DataType::Float32 => TypeNode::scalar("float32"),
        DataType::Float64 => TypeNode::scalar("float64"),
        DataType::Decimal128(precision, scale) => TypeNode::Scalar(
            Scalar::new("decimal128").with_params([
                ScalarParam::Int(i64::from(*precision)),
                ScalarParam::Int(i64::from(*scale)),
            ]),
        ),
        DataType::Time32(unit) => with_unit("time32", *unit),
        DataType::Time64(unit) => with_unit("time64", *unit),
        DataType::Timestamp(unit, tz) => {
            let node = with_unit("timestamp", *unit);
            if tz.is_some() {
                warnings.record(data_type.to_string(), node.to_string(), "agnostic");
            }
            node
        }
        DataType::Date32 => TypeNode::scalar("date32"),
        DataType::Date64 => TypeNode::scalar("date64"),
        DataType::Utf8 => TypeNode::scalar("string"),
        DataType::LargeUtf8 => TypeNode::scalar("large_string"),
        DataType::Binary => TypeNode::scalar("binary"),
        DataType::FixedSizeBinary(width) => TypeNode::Scalar(
            Scalar::new("binary").with_params([ScalarParam::Int(i64::from(*width))]),
        ),
        DataType::LargeBinary => TypeNode::scalar("large_binary"),
        DataType::List(field) => TypeNode::list(arrow_to_node(field.data_type(), warnings)?),
        DataType::LargeList(field) => {
            TypeNode::large_list(arrow_to_node(field.data_type(), warnings)?)
        }
        DataType::Struct(fields) => {
            let mut converted = Vec::with_capacity(fields.len());
            for field in fields.iter() {
                converted.push((field.name().clone(), arrow_to_node(field.data_type(), warnings)?));
            }
            TypeNode::Struct { fields: converted }
        }
        other => return Err(ConvertError::unsupported(other.to_string(), "agnostic")),
    };
    Ok(node)
}

/// Converts a native [`DataType`] into an agnostic type string.
///
/// # Errors
///
/// See [`arrow_to_node`].
pub fn arrow_to_agnostic(
    data_type: &DataType,
    warnings: &mut WarningCollector,
) -> ConvertResult<String> {
    arrow_to_node(data_type, warnings).map(|node| node.to_string())
}

/// Converts [`Metadata`] to and from an Arrow [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct ArrowConverter {
    config: ConverterConfig,
}

impl ArrowConverter {
    /// Creates a converter with the given config.
    #[must_use]
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    fn column_to_field(&self, column: &Column) -> ConvertResult<Field> {
        let data_type = agnostic_to_arrow(&column.type_name)?;
        let field = Field::new(
            &column.name,
            data_type,
            column.is_nullable(self.config.default_nullable),
        );
        Ok(match &column.description {
            Some(description) => field.with_metadata(HashMap::from([(
                DESCRIPTION_KEY.to_string(),
                description.clone(),
            )])),
            None => field,
        })
    }
}

impl MetadataConverter for ArrowConverter {
    type Output = Schema;

    fn target(&self) -> &str {
        TARGET
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn generate_from_meta(&self, metadata: &Metadata) -> ConvertResult<Converted<Schema>> {
        metadata.validate(&self.config)?;
        let fields = metadata
            .columns
            .iter()
            .map(|c| self.column_to_field(c).map_err(|e| e.in_column(&c.name)))
            .collect::<ConvertResult<Vec<_>>>()?;

        let mut schema_metadata = HashMap::from([(NAME_KEY.to_string(), metadata.name.clone())]);
        if !metadata.description.is_empty() {
            schema_metadata.insert(DESCRIPTION_KEY.to_string(), metadata.description.clone());
        }
        tracing::debug!(table = %metadata.name, columns = fields.len(), "generated arrow schema");
        Ok(Converted::new(
            Schema::new(fields).with_metadata(schema_metadata),
            Vec::new(),
        ))
    }

    fn generate_to_meta(&self, schema: &Schema) -> ConvertResult<Converted<Metadata>> {
        let mut warnings = self.config.warning_collector();
        let mut columns = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            warnings.set_column(Some(field.name().as_str()));
            let node = arrow_to_node(field.data_type(), &mut warnings)
                .map_err(|e| e.in_column(field.name()))?;
            columns.push(Column {
                name: field.name().clone(),
                type_name: node.to_string(),
                description: field.metadata().get(DESCRIPTION_KEY).cloned(),
                nullable: Some(field.is_nullable()),
            });
        }
        let metadata = Metadata {
            name: schema.metadata().get(NAME_KEY).cloned().unwrap_or_default(),
            description: schema
                .metadata()
                .get(DESCRIPTION_KEY)
                .cloned()
                .unwrap_or_default(),
            columns,
            ..Metadata::default()
        };
        Ok(Converted::new(metadata, warnings.into_warnings()))
    }
}

/// Agnostic-to-arrow-text scalar table.
#[must_use]
pub fn text_export_table() -> ScalarTable {
    let mut table = ScalarTable::new();
    for name in IDENTICAL {
        table.insert(name, ScalarMapping::exact(*name));
    }
    for name in ["decimal128", "time32", "time64", "timestamp"] {
        table.insert(name, ScalarMapping::exact(name).keep_params());
    }
    table
        .with("float16", ScalarMapping::exact("halffloat"))
        .with("float32", ScalarMapping::exact("float"))
        .with("float64", ScalarMapping::exact("double"))
        .with("date32", ScalarMapping::exact("date32").fixed_params([ScalarParam::from("day")]))
        .with("date64", ScalarMapping::exact("date64").fixed_params([ScalarParam::from("ms")]))
        .with("utf8", ScalarMapping::exact("string"))
        .with("large_utf8", ScalarMapping::exact("large_string"))
        .with("binary()", ScalarMapping::exact("fixed_size_binary").keep_params())
}

/// Arrow-text-to-agnostic scalar table.
#[must_use]
pub fn text_import_table() -> ScalarTable {
    let mut table = ScalarTable::new();
    for name in IDENTICAL {
        table.insert(name, ScalarMapping::exact(*name));
    }
    for name in ["decimal128", "time32", "time64"] {
        table.insert(name, ScalarMapping::exact(name).keep_params());
    }
    table
        // `timestamp[unit, tz=...]`: the timezone has no agnostic spelling.
        .with("timestamp", ScalarMapping::exact("timestamp").truncate_params(1))
        .with("halffloat", ScalarMapping::exact("float16"))
        .with("float", ScalarMapping::exact("float32"))
        .with("double", ScalarMapping::exact("float64"))
        .with("date32", ScalarMapping::exact("date32").drop_params())
        .with("date64", ScalarMapping::exact("date64").drop_params())
        .with("utf8", ScalarMapping::exact("string"))
        .with("large_utf8", ScalarMapping::exact("large_string"))
        .with("fixed_size_binary", ScalarMapping::exact("binary").keep_params())
}

/// Names spelled the same on both sides.
const IDENTICAL: &[&str] = &[
    "null",
    "bool",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "string",
    "large_string",
    "binary",
    "large_binary",
];

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::Fields;

    #[test]
    fn test_nested_struct_end_to_end() {
        let dt = agnostic_to_arrow(
            "struct<a:timestamp(s),b:struct<f1:int32,f2:string,f3:decimal128(3,5)>>",
        )
        .unwrap();
        let expected = DataType::Struct(Fields::from(vec![
            Field::new("a", DataType::Timestamp(TimeUnit::Second, None), true),
            Field::new(
                "b",
                DataType::Struct(Fields::from(vec![
                    Field::new("f1", DataType::Int32, true),
                    Field::new("f2", DataType::Utf8, true),
                    Field::new("f3", DataType::Decimal128(3, 5), true),
                ])),
                true,
            ),
        ]));
        assert_eq!(dt, expected);
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            agnostic_to_arrow("list<int64>").unwrap(),
            DataType::List(Arc::new(Field::new("item", DataType::Int64, true)))
        );
        assert_eq!(
            agnostic_to_arrow("large_list<list<string>>").unwrap(),
            DataType::LargeList(Arc::new(Field::new(
                "item",
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
                true
            )))
        );
    }

    #[test]
    fn test_scalars() {
        for (input, expected) in [
            ("float16", DataType::Float16),
            ("binary(16)", DataType::FixedSizeBinary(16)),
            ("binary", DataType::Binary),
            ("utf8", DataType::Utf8),
            ("large_utf8", DataType::LargeUtf8),
            ("time32(ms)", DataType::Time32(TimeUnit::Millisecond)),
            ("time64(ns)", DataType::Time64(TimeUnit::Nanosecond)),
            ("decimal128(38,-2)", DataType::Decimal128(38, -2)),
        ] {
            assert_eq!(agnostic_to_arrow(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_invalid_params() {
        for input in [
            "decimal128(0,2)",
            "decimal128(39,2)",
            "decimal128(10)",
            "time32(ns)",
            "time64(s)",
            "timestamp",
            "timestamp(hours)",
            "binary(0)",
            "int64(8)",
        ] {
            let err = agnostic_to_arrow(input).unwrap_err();
            assert!(
                matches!(err, ConvertError::InvalidParameters { .. }),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn test_unknown_scalar_unsupported() {
        let err = agnostic_to_arrow("struct<a:varchar>").unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_arrow_to_agnostic() {
        let mut w = WarningCollector::new();
        let dt = agnostic_to_arrow("struct<a:list<binary(4)>,b:decimal128(10,2),c:date64>").unwrap();
        assert_eq!(
            arrow_to_agnostic(&dt, &mut w).unwrap(),
            "struct<a:list<binary(4)>,b:decimal128(10,2),c:date64>"
        );
        assert!(w.is_empty());
    }

    #[test]
    fn test_timezone_is_lossy() {
        let dt = DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()));
        let mut w = WarningCollector::new();
        assert_eq!(arrow_to_agnostic(&dt, &mut w).unwrap(), "timestamp(ms)");
        assert_eq!(w.len(), 1);

        let mut ignored = WarningCollector::ignoring();
        assert_eq!(arrow_to_agnostic(&dt, &mut ignored).unwrap(), "timestamp(ms)");
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_text_timezone_is_lossy() {
        let adapter = crate::GrammarAdapter::arrow_text();
        let mut w = WarningCollector::new();
        let imported = adapter
            .to_agnostic("struct<at: timestamp[ms, tz=UTC], seen: timestamp[us]>", &mut w)
            .unwrap();
        assert_eq!(imported, "struct<at:timestamp(ms),seen:timestamp(us)>");
        assert_eq!(w.len(), 1);
        assert_eq!(w.warnings()[0].source_type, "timestamp[ms, tz=UTC]");

        let dt = agnostic_to_arrow(&imported).unwrap();
        let DataType::Struct(fields) = dt else {
            panic!("expected struct");
        };
        assert_eq!(
            fields[0].data_type(),
            &DataType::Timestamp(TimeUnit::Millisecond, None)
        );
    }

    #[test]
    fn test_unsupported_native_types() {
        let mut w = WarningCollector::new();
        for dt in [
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
            DataType::Duration(TimeUnit::Second),
            DataType::Utf8View,
            DataType::Decimal256(40, 2),
        ] {
            assert!(arrow_to_node(&dt, &mut w).unwrap_err().is_unsupported(), "{dt}");
        }
    }

    #[test]
    fn test_schema_round_trip() {
        let metadata = Metadata::new("events")
            .with_description("raw events")
            .with_column(Column::new("id", "int64").with_nullable(false))
            .with_column(Column::new("at", "timestamp(us)").with_description("event time"))
            .with_column(Column::new("tags", "list<string>"));
        let converter = ArrowConverter::default();

        let schema = converter.generate_from_meta(&metadata).unwrap().value;
        assert_eq!(schema.fields().len(), 3);
        assert!(!schema.field(0).is_nullable());
        assert!(schema.field(1).is_nullable());
        assert_eq!(
            schema.field(1).metadata().get(DESCRIPTION_KEY).map(String::as_str),
            Some("event time")
        );
        assert_eq!(schema.metadata().get(NAME_KEY).map(String::as_str), Some("events"));

        let back = converter.generate_to_meta(&schema).unwrap();
        assert!(back.warnings.is_empty());
        assert_eq!(back.value.name, "events");
        assert_eq!(back.value.description, "raw events");
        assert_eq!(back.value.column_names(), vec!["id", "at", "tags"]);
        assert_eq!(back.value.columns[1].type_name, "timestamp(us)");
        assert_eq!(back.value.columns[1].description.as_deref(), Some("event time"));
        assert_eq!(back.value.columns[0].nullable, Some(false));
    }

    #[test]
    fn test_default_nullable_from_config() {
        let metadata = Metadata::new("t").with_column(Column::new("a", "int32"));
        let converter = ArrowConverter::new(ConverterConfig::default().with_default_nullable(false));
        let schema = converter.generate_from_meta(&metadata).unwrap().value;
        assert!(!schema.field(0).is_nullable());
    }

    #[test]
    fn test_schema_error_names_column() {
        let metadata = Metadata::new("t")
            .with_column(Column::new("ok", "int32"))
            .with_column(Column::new("bad", "decimal128(99,1)"));
        let err = ArrowConverter::default().generate_from_meta(&metadata).unwrap_err();
        match err {
            ConvertError::Column { column, source } => {
                assert_eq!(column, "bad");
                assert!(matches!(*source, ConvertError::InvalidParameters { .. }));
            }
            other => panic!("expected column error, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_to_meta_warns_per_column() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Timestamp(TimeUnit::Second, Some("+01:00".into())), true),
            Field::new("b", DataType::Int8, true),
        ]);
        let converted = ArrowConverter::default().generate_to_meta(&schema).unwrap();
        assert_eq!(converted.warnings.len(), 1);
        assert_eq!(converted.warnings[0].column.as_deref(), Some("a"));
        assert_eq!(converted.value.columns[0].type_name, "timestamp(s)");
    }
}
