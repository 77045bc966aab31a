//! Grammar adapters and their registry.
//!
//! A [`GrammarAdapter`] pairs a target [`Grammar`] with two
//! [`ScalarTable`]s: `export` translates agnostic scalars into the target's
//! names, `import` translates them back. Compound structure is handled by the
//! shared tree walk, so an adapter only ever reasons about leaves.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use typebridge_grammar::{
    convert, format_scalar, map_scalars, parse, parse_with, print, Grammar, Scalar, TextAssembler,
    TypeNode,
};

use crate::error::{ConvertError, ConvertResult};
use crate::table::ScalarTable;
use crate::warning::WarningCollector;
use crate::{arrow, etl_manager, hive};

/// Registry name reserved for the agnostic grammar itself.
pub const AGNOSTIC: &str = "agnostic";

/// Translates type strings between the agnostic grammar and one target.
#[derive(Debug, Clone)]
pub struct GrammarAdapter {
    name: String,
    grammar: Grammar,
    export: ScalarTable,
    import: ScalarTable,
}

impl GrammarAdapter {
    /// Creates an adapter from its parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        grammar: Grammar,
        export: ScalarTable,
        import: ScalarTable,
    ) -> Self {
        Self {
            name: name.into(),
            grammar,
            export,
            import,
        }
    }

    /// The columnar format's textual type names (`timestamp[ms]`, `halffloat`).
    #[must_use]
    pub fn arrow_text() -> Self {
        Self::new(
            "arrow",
            Grammar::arrow(),
            arrow::text_export_table(),
            arrow::text_import_table(),
        )
    }

    /// Hive / catalog column types.
    #[must_use]
    pub fn hive() -> Self {
        Self::new("hive", Grammar::hive(), hive::export_table(), hive::import_table())
    }

    /// The ETL manager's column types.
    #[must_use]
    pub fn etl_manager() -> Self {
        Self::new(
            "etl_manager",
            Grammar::etl_manager(),
            etl_manager::export_table(),
            etl_manager::import_table(),
        )
    }

    /// Adapter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target grammar.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Agnostic-to-target scalar table.
    #[must_use]
    pub fn export_table(&self) -> &ScalarTable {
        &self.export
    }

    /// Target-to-agnostic scalar table.
    #[must_use]
    pub fn import_table(&self) -> &ScalarTable {
        &self.import
    }

    /// Translates one agnostic scalar into the target.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedType`] if the target cannot
    /// represent the scalar.
    pub fn export_scalar(
        &self,
        scalar: &Scalar,
        warnings: &mut WarningCollector,
    ) -> ConvertResult<Scalar> {
        let mapped = self.export.apply(scalar, &self.name)?;
        if !mapped.fully_supported {
            warnings.record(
                scalar.to_string(),
                format_scalar(&mapped.scalar, &self.grammar),
                &self.name,
            );
        }
        Ok(mapped.scalar)
    }

    /// Translates one target scalar into the agnostic grammar.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedType`] for target names with no
    /// agnostic counterpart.
    pub fn import_scalar(
        &self,
        scalar: &Scalar,
        warnings: &mut WarningCollector,
    ) -> ConvertResult<Scalar> {
        let mapped = self.import.apply(scalar, &self.name)?;
        if !mapped.fully_supported {
            warnings.record(
                format_scalar(scalar, &self.grammar),
                mapped.scalar.to_string(),
                &self.name,
            );
        }
        Ok(mapped.scalar)
    }

    /// Translates an agnostic tree into a target tree.
    ///
    /// # Errors
    ///
    /// Fails on the first unsupported leaf.
    pub fn export_node(
        &self,
        node: &TypeNode,
        warnings: &mut WarningCollector,
    ) -> ConvertResult<TypeNode> {
        map_scalars(node, |s| self.export_scalar(s, warnings).map(TypeNode::Scalar))
    }

    /// Translates a target tree into an agnostic tree.
    ///
    /// # Errors
    ///
    /// Fails on the first unsupported leaf.
    pub fn import_node(
        &self,
        node: &TypeNode,
        warnings: &mut WarningCollector,
    ) -> ConvertResult<TypeNode> {
        map_scalars(node, |s| self.import_scalar(s, warnings).map(TypeNode::Scalar))
    }

    /// Translates an agnostic type string straight to a target type string.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed input, or
    /// [`ConvertError::UnsupportedType`] on the first unsupported leaf.
    pub fn to_target(&self, agnostic: &str, warnings: &mut WarningCollector) -> ConvertResult<String> {
        let node = parse(agnostic)?;
        let mut leaf = |s: &Scalar| {
            self.export_scalar(s, warnings)
                .map(|t| format_scalar(&t, &self.grammar))
        };
        let out = convert(&node, &mut leaf, &mut TextAssembler::new(&self.grammar))?;
        tracing::debug!(adapter = %self.name, input = agnostic, output = %out, "exported type");
        Ok(out)
    }

    /// Translates a target type string into an agnostic type string.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed input, or
    /// [`ConvertError::UnsupportedType`] on the first unsupported leaf.
    pub fn to_agnostic(&self, target: &str, warnings: &mut WarningCollector) -> ConvertResult<String> {
        let node = parse_with(target, &self.grammar)?;
        let agnostic = Grammar::agnostic();
        let mut leaf = |s: &Scalar| self.import_scalar(s, warnings).map(|t| t.to_string());
        let out = convert(&node, &mut leaf, &mut TextAssembler::new(&agnostic))?;
        tracing::debug!(adapter = %self.name, input = target, output = %out, "imported type");
        Ok(out)
    }
}

/// Named collection of adapters.
///
/// Registries are ordinary values; callers own and share them explicitly.
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<GrammarAdapter>>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry holding the arrow, hive and etl_manager adapters.
    #[must_use]
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(GrammarAdapter::arrow_text());
        registry.register(GrammarAdapter::hive());
        registry.register(GrammarAdapter::etl_manager());
        registry
    }

    /// Registers an adapter, replacing any with the same name.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn register(&self, adapter: GrammarAdapter) {
        let name = adapter.name().to_string();
        tracing::debug!(adapter = %name, "registering grammar adapter");
        self.adapters
            .write()
            .expect("adapter registry poisoned")
            .insert(name, Arc::new(adapter));
    }

    /// Gets an adapter by name, if registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<GrammarAdapter>> {
        self.adapters
            .read()
            .expect("adapter registry poisoned")
            .get(name)
            .cloned()
    }

    /// Gets an adapter by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnknownAdapter`] if none is registered.
    pub fn require(&self, name: &str) -> ConvertResult<Arc<GrammarAdapter>> {
        self.get(name)
            .ok_or_else(|| ConvertError::UnknownAdapter(name.to_string()))
    }

    /// Returns the names of all registered adapters, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .adapters
            .read()
            .expect("adapter registry poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Translates `input` from grammar `from` to grammar `to`, going through
    /// the agnostic tree. Either side may be [`AGNOSTIC`].
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnknownAdapter`] for unregistered names, or
    /// any parse or conversion error from either leg.
    pub fn translate(
        &self,
        from: &str,
        to: &str,
        input: &str,
        warnings: &mut WarningCollector,
    ) -> ConvertResult<String> {
        let agnostic = if from == AGNOSTIC {
            parse(input)?
        } else {
            let source = self.require(from)?;
            source.import_node(&parse_with(input, source.grammar())?, warnings)?
        };
        if to == AGNOSTIC {
            return Ok(print(&agnostic, &Grammar::agnostic()));
        }
        let target = self.require(to)?;
        let out = target.export_node(&agnostic, warnings)?;
        Ok(print(&out, target.grammar()))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.registered_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ScalarMapping;

    /// Canonical agnostic types each built-in adapter round-trips exactly.
    fn canonical(adapter: &str) -> &'static [&'static str] {
        match adapter {
            "arrow" => &[
                "null", "bool", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32",
                "uint64", "float16", "float32", "float64", "decimal128(38,10)", "time32(ms)",
                "time64(ns)", "timestamp(us)", "date32", "date64", "string", "large_string",
                "binary", "binary(16)", "large_binary",
            ],
            "hive" => &[
                "bool", "int8", "int16", "int32", "int64", "float32", "float64",
                "decimal128(10,2)", "timestamp(ms)", "date32", "string", "binary",
            ],
            "etl_manager" => &[
                "bool", "int32", "int64", "float32", "float64", "decimal128(10,2)",
                "timestamp(s)", "date32", "string", "binary",
            ],
            _ => &[],
        }
    }

    #[test]
    fn test_fully_supported_round_trip() {
        let registry = AdapterRegistry::with_builtin();
        for name in registry.registered_names() {
            let adapter = registry.require(&name).unwrap();
            for ty in canonical(&name) {
                let mut warnings = WarningCollector::new();
                let target = adapter.to_target(ty, &mut warnings).unwrap();
                let back = adapter.to_agnostic(&target, &mut warnings).unwrap();
                assert_eq!(&back, ty, "{name}: {ty} -> {target} -> {back}");
                assert!(warnings.is_empty(), "{name}: {ty} warned {:?}", warnings.warnings());
            }
        }
    }

    #[test]
    fn test_round_trip_nested() {
        let adapter = GrammarAdapter::hive();
        let input = "struct<a:int64,b:list<struct<c:decimal128(10,2),d:string>>>";
        let mut w = WarningCollector::new();
        let hive = adapter.to_target(input, &mut w).unwrap();
        assert_eq!(hive, "struct<a:bigint,b:array<struct<c:decimal(10,2),d:string>>>");
        assert_eq!(adapter.to_agnostic(&hive, &mut w).unwrap(), input);
        assert!(w.is_empty());
    }

    #[test]
    fn test_unsupported_uint64() {
        for adapter in [GrammarAdapter::hive(), GrammarAdapter::etl_manager()] {
            let err = adapter
                .to_target("struct<id:uint64>", &mut WarningCollector::new())
                .unwrap_err();
            assert!(err.is_unsupported(), "{}: {err}", adapter.name());
        }
    }

    #[test]
    fn test_lossy_warns_exactly_once() {
        let adapter = GrammarAdapter::etl_manager();
        let mut warned = WarningCollector::new();
        let out = adapter.to_target("uint8", &mut warned).unwrap();
        assert_eq!(out, "int");
        assert_eq!(warned.len(), 1);
        assert_eq!(warned.warnings()[0].source_type, "uint8");
        assert_eq!(warned.warnings()[0].target_type, "int");

        let mut ignored = WarningCollector::ignoring();
        let quiet = adapter.to_target("uint8", &mut ignored).unwrap();
        assert!(ignored.is_empty());
        assert_eq!(quiet, out);
    }

    #[test]
    fn test_one_warning_per_lossy_leaf() {
        let adapter = GrammarAdapter::etl_manager();
        let mut w = WarningCollector::new();
        adapter
            .to_target("struct<a:uint8,b:list<uint16>,c:int32>", &mut w)
            .unwrap();
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_tree_mode_matches_flatten_mode() {
        let adapter = GrammarAdapter::arrow_text();
        let input = "struct<a:timestamp(ms),b:large_list<float16>>";
        let mut w = WarningCollector::new();
        let tree = adapter.export_node(&parse(input).unwrap(), &mut w).unwrap();
        assert_eq!(
            print(&tree, adapter.grammar()),
            adapter.to_target(input, &mut w).unwrap()
        );
        assert_eq!(
            print(&tree, adapter.grammar()),
            "struct<a: timestamp[ms], b: large_list<item: halffloat>>"
        );
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = GrammarAdapter::hive()
            .to_target("struct<a:int64", &mut WarningCollector::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }

    #[test]
    fn test_registry_translate_between_targets() {
        let registry = AdapterRegistry::with_builtin();
        let mut w = WarningCollector::new();
        let out = registry
            .translate("hive", "etl_manager", "array<struct<x:bigint,y:string>>", &mut w)
            .unwrap();
        assert_eq!(out, "array<struct<x:long,y:character>>");
        assert_eq!(
            registry
                .translate("etl_manager", AGNOSTIC, "datetime", &mut w)
                .unwrap(),
            "timestamp(s)"
        );
        assert!(w.is_empty());
    }

    #[test]
    fn test_registry_unknown_adapter() {
        let registry = AdapterRegistry::new();
        assert!(registry.get("hive").is_none());
        let err = registry
            .translate(AGNOSTIC, "hive", "int64", &mut WarningCollector::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownAdapter(name) if name == "hive"));
    }

    #[test]
    fn test_registry_custom_adapter_replaces() {
        let registry = AdapterRegistry::with_builtin();
        let custom = GrammarAdapter::new(
            "hive",
            Grammar::hive(),
            ScalarTable::new().with("int64", ScalarMapping::exact("long")),
            ScalarTable::new(),
        );
        registry.register(custom);
        assert_eq!(registry.registered_names(), vec!["arrow", "etl_manager", "hive"]);
        let out = registry
            .translate(AGNOSTIC, "hive", "int64", &mut WarningCollector::new())
            .unwrap();
        assert_eq!(out, "long");
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdapterRegistry>();
        assert_send_sync::<GrammarAdapter>();
    }
}
