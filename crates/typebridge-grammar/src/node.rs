//! Parsed type trees.
//!
//! A [`TypeNode`] is the structured form of one type expression. Trees are
//! built fresh by the parser, transformed by [`convert`](crate::convert()),
//! and discarded after printing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::Grammar;
use crate::printer;

/// One parameter of a parameterized scalar (`decimal128(38,2)`, `timestamp(ms)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarParam {
    /// Numeric parameter (precision, scale, width).
    Int(i64),
    /// Textual parameter (time unit codes and the like).
    Str(String),
}

impl ScalarParam {
    /// Classifies a raw parameter: base-10 integers become [`ScalarParam::Int`],
    /// anything else is kept as trimmed text.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Str(trimmed.to_string()),
        }
    }

    /// Returns the integer value, if numeric.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    /// Returns the text value, if textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for ScalarParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ScalarParam {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for ScalarParam {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// A leaf type: a name plus an optional parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scalar {
    /// The type name (`int64`, `decimal128`, `timestamp`).
    pub name: String,
    /// Parameters in declaration order; empty for plain scalars.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ScalarParam>,
}

impl Scalar {
    /// Creates a scalar with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Sets the parameter list.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = ScalarParam>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Whether the scalar carries a parameter list.
    #[must_use]
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// Integer parameter at `idx`, if present and numeric.
    #[must_use]
    pub fn int_param(&self, idx: usize) -> Option<i64> {
        self.params.get(idx).and_then(ScalarParam::as_int)
    }

    /// Text parameter at `idx`, if present and textual.
    #[must_use]
    pub fn str_param(&self, idx: usize) -> Option<&str> {
        self.params.get(idx).and_then(ScalarParam::as_str)
    }
}

/// Renders the reconstructed agnostic scalar string, e.g. `decimal128(38,2)`.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::format_scalar(self, &Grammar::agnostic()))
    }
}

/// Offset width of a list type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListVariant {
    /// 32-bit offsets (`list<...>`).
    List,
    /// 64-bit offsets (`large_list<...>`).
    LargeList,
}

/// The parsed representation of one type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    /// A leaf type.
    Scalar(Scalar),
    /// A struct; field order is significant.
    Struct {
        /// `(field_name, field_type)` pairs in declaration order.
        fields: Vec<(String, TypeNode)>,
    },
    /// A list of a single element type.
    List {
        /// The element type.
        element: Box<TypeNode>,
        /// 32- or 64-bit offsets.
        variant: ListVariant,
    },
}

impl TypeNode {
    /// Shorthand for a parameterless scalar node.
    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::Scalar(Scalar::new(name))
    }

    /// Shorthand for a `list<element>` node.
    #[must_use]
    pub fn list(element: TypeNode) -> Self {
        Self::List {
            element: Box::new(element),
            variant: ListVariant::List,
        }
    }

    /// Shorthand for a `large_list<element>` node.
    #[must_use]
    pub fn large_list(element: TypeNode) -> Self {
        Self::List {
            element: Box::new(element),
            variant: ListVariant::LargeList,
        }
    }

    /// Shorthand for a struct node.
    #[must_use]
    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, TypeNode)>) -> Self {
        Self::Struct {
            fields: fields.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        }
    }

    /// Whether this node is a struct or list.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }

    /// Nesting depth: 0 for a scalar, 1 + deepest child otherwise.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Scalar(_) => 0,
            Self::List { element, .. } => 1 + element.depth(),
            Self::Struct { fields } => 1 + fields.iter().map(|(_, t)| t.depth()).max().unwrap_or(0),
        }
    }

    /// Returns the first struct field name that repeats within its struct,
    /// searching the whole tree depth-first.
    #[must_use]
    pub fn duplicate_field_name(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::List { element, .. } => element.duplicate_field_name(),
            Self::Struct { fields } => {
                for (i, (name, _)) in fields.iter().enumerate() {
                    if fields[..i].iter().any(|(other, _)| other == name) {
                        return Some(name);
                    }
                }
                fields.iter().find_map(|(_, t)| t.duplicate_field_name())
            }
        }
    }
}

/// Renders the tree in the agnostic grammar.
impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::print(self, &Grammar::agnostic()))
    }
}
