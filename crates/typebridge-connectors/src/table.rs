//! Scalar translation tables.
//!
//! A [`ScalarTable`] maps scalar names of one type system onto another.
//! Keys take three forms, tried in order:
//!
//! 1. the full agnostic spelling, e.g. `timestamp(s)`
//! 2. `name()`, matching any parameterized use of `name`
//! 3. the bare `name`
//!
//! so a table can give `timestamp(s)` an exact mapping while every other
//! unit falls back to a lossy one.

use std::collections::HashMap;

use typebridge_grammar::{Scalar, ScalarParam};

use crate::error::{ConvertError, ConvertResult};

/// What happens to a source scalar's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamRule {
    /// Carry parameters over unchanged.
    Keep,
    /// Discard parameters.
    Drop,
    /// Replace parameters with a fixed list.
    Fixed(Vec<ScalarParam>),
    /// Keep at most the first `n` parameters; cutting any makes the
    /// translation lossy.
    Truncate(usize),
    /// Parameters make the scalar unsupported.
    Reject,
}

/// One table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMapping {
    /// Target name; `None` marks the source type as unsupported.
    pub target: Option<String>,
    /// Whether the mapping preserves all information.
    pub fully_supported: bool,
    /// Parameter handling.
    pub params: ParamRule,
}

impl ScalarMapping {
    /// An information-preserving mapping.
    #[must_use]
    pub fn exact(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            fully_supported: true,
            params: ParamRule::Reject,
        }
    }

    /// A mapping with a representation that loses information.
    #[must_use]
    pub fn lossy(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            fully_supported: false,
            params: ParamRule::Reject,
        }
    }

    /// A type with no representation in the target.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            target: None,
            fully_supported: false,
            params: ParamRule::Reject,
        }
    }

    /// Carries parameters over unchanged.
    #[must_use]
    pub fn keep_params(mut self) -> Self {
        self.params = ParamRule::Keep;
        self
    }

    /// Discards parameters.
    #[must_use]
    pub fn drop_params(mut self) -> Self {
        self.params = ParamRule::Drop;
        self
    }

    /// Keeps the first `n` parameters and marks the translation lossy
    /// whenever more were present.
    #[must_use]
    pub fn truncate_params(mut self, n: usize) -> Self {
        self.params = ParamRule::Truncate(n);
        self
    }

    /// Replaces parameters with `params`.
    #[must_use]
    pub fn fixed_params(mut self, params: impl IntoIterator<Item = ScalarParam>) -> Self {
        self.params = ParamRule::Fixed(params.into_iter().collect());
        self
    }
}

/// A scalar after table translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedScalar {
    /// The translated scalar.
    pub scalar: Scalar,
    /// Whether the translation preserved all information.
    pub fully_supported: bool,
}

/// Name-keyed scalar translation table.
#[derive(Debug, Clone, Default)]
pub struct ScalarTable {
    entries: HashMap<String, ScalarMapping>,
    case_insensitive: bool,
}

impl ScalarTable {
    /// Creates an empty, case-sensitive table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table that matches names ignoring ASCII case.
    #[must_use]
    pub fn case_insensitive() -> Self {
        Self {
            entries: HashMap::new(),
            case_insensitive: true,
        }
    }

    /// Adds an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: &str, mapping: ScalarMapping) -> Self {
        self.insert(key, mapping);
        self
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, key: &str, mapping: ScalarMapping) {
        let key = self.normalize(key);
        self.entries.insert(key, mapping);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, mapping)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarMapping)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn normalize(&self, key: &str) -> String {
        if self.case_insensitive {
            key.to_ascii_lowercase()
        } else {
            key.to_string()
        }
    }

    /// Finds the entry for `scalar`, most specific key first.
    #[must_use]
    pub fn lookup(&self, scalar: &Scalar) -> Option<&ScalarMapping> {
        let full = self.normalize(&scalar.to_string());
        if let Some(mapping) = self.entries.get(&full) {
            return Some(mapping);
        }
        let name = self.normalize(&scalar.name);
        if scalar.has_params() {
            if let Some(mapping) = self.entries.get(&format!("{name}()")) {
                return Some(mapping);
            }
        }
        self.entries.get(&name)
    }

    /// Translates `scalar`, naming `target` in any error.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedType`] if the scalar has no entry,
    /// maps to nothing, or carries parameters its entry rejects.
    pub fn apply(&self, scalar: &Scalar, target: &str) -> ConvertResult<MappedScalar> {
        let unsupported = || ConvertError::unsupported(scalar.to_string(), target);
        let mapping = self.lookup(scalar).ok_or_else(unsupported)?;
        let name = mapping.target.as_ref().ok_or_else(unsupported)?;
        let mut fully_supported = mapping.fully_supported;
        let params = match &mapping.params {
            ParamRule::Keep => scalar.params.clone(),
            ParamRule::Truncate(n) => {
                fully_supported &= scalar.params.len() <= *n;
                scalar.params.iter().take(*n).cloned().collect()
            }
            ParamRule::Drop => Vec::new(),
            ParamRule::Fixed(params) => params.clone(),
            ParamRule::Reject if scalar.has_params() => return Err(unsupported()),
            ParamRule::Reject => Vec::new(),
        };
        Ok(MappedScalar {
            scalar: Scalar::new(name.clone()).with_params(params),
            fully_supported,
        })
    }
}
