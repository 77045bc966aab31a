//! Parse error types.
//!
//! Every malformed type string is reported through [`ParseError`] at parse
//! time; the parser never hands back a partial tree.

use thiserror::Error;

/// Result alias for grammar operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while splitting or parsing a type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The type string (or a nested component of it) is empty.
    #[error("empty type string")]
    Empty,

    /// A closing bracket appeared with no matching opening bracket.
    #[error("unbalanced '{bracket}' at position {position} in '{input}'")]
    UnbalancedBracket {
        /// The offending closing bracket.
        bracket: char,
        /// Byte offset of the bracket within `input`.
        position: usize,
        /// The text being split.
        input: String,
    },

    /// An opening bracket was never closed.
    #[error("unclosed '{bracket}' in '{input}'")]
    UnclosedBracket {
        /// The opening bracket left open.
        bracket: char,
        /// The text being split.
        input: String,
    },

    /// Characters follow the closing bracket of a type expression.
    #[error("unexpected trailing input after type expression in '{input}'")]
    TrailingInput {
        /// The full type string.
        input: String,
    },

    /// The keyword before `<` is not a compound type of the grammar.
    #[error("unknown compound type '{keyword}' in grammar '{grammar}'")]
    UnknownCompound {
        /// The keyword found before `<`.
        keyword: String,
        /// Name of the grammar used for parsing.
        grammar: String,
    },

    /// A struct field has no `:` between its name and type.
    #[error("struct field '{field}' is missing a ':' separator")]
    MissingFieldSeparator {
        /// The raw field text.
        field: String,
    },

    /// A struct field has an empty name.
    #[error("struct field with empty name: '{field}'")]
    EmptyFieldName {
        /// The raw field text.
        field: String,
    },

    /// A struct has an empty entry between delimiters.
    #[error("empty field in struct '{input}'")]
    EmptyField {
        /// The full struct text.
        input: String,
    },

    /// A list declares anything other than exactly one element type.
    #[error("list type '{input}' must declare exactly one element type")]
    ListArity {
        /// The full list text.
        input: String,
    },

    /// A scalar type name is empty or contains structural characters.
    #[error("invalid type name '{name}'")]
    InvalidTypeName {
        /// The rejected name.
        name: String,
    },

    /// The input nests more compounds than the parser allows.
    #[error("type nesting exceeds the maximum depth of {limit}")]
    TooDeep {
        /// The configured maximum depth.
        limit: usize,
    },

    /// A scalar parameter list contains an empty entry.
    #[error("empty parameter in '{input}'")]
    EmptyParameter {
        /// The full scalar text.
        input: String,
    },
}
