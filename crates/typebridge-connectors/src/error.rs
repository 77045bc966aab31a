//! Conversion error types.
//!
//! Provides [`ConvertError`] for adapter and converter operations, plus a
//! convenience [`ConvertResult`] alias.

use thiserror::Error;
use typebridge_grammar::ParseError;

/// Result alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while converting types or metadata.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A type string does not conform to its grammar.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A scalar has no representation in the target type system.
    #[error("type '{type_name}' has no representation in {target}")]
    UnsupportedType {
        /// The scalar as written in the source grammar.
        type_name: String,
        /// The adapter or converter that rejected it.
        target: String,
    },

    /// A scalar's parameters are out of range or of the wrong kind.
    #[error("invalid parameters for '{type_name}': {message}")]
    InvalidParameters {
        /// The scalar as written in the source grammar.
        type_name: String,
        /// What was wrong with the parameters.
        message: String,
    },

    /// A conversion failed for one column of a schema.
    #[error("column '{column}': {source}")]
    Column {
        /// The failing column.
        column: String,
        /// The underlying error.
        #[source]
        source: Box<ConvertError>,
    },

    /// The metadata envelope is structurally invalid.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// A configuration value is invalid.
    #[error("invalid config key '{key}': {message}")]
    InvalidConfig {
        /// The configuration key.
        key: String,
        /// What was wrong with the value.
        message: String,
    },

    /// No adapter is registered under the requested name.
    #[error("unknown adapter: {0}")]
    UnknownAdapter(String),

    /// An Arrow error propagated from schema construction.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// A JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error while reading or writing metadata files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Builds an [`ConvertError::UnsupportedType`].
    pub fn unsupported(type_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            target: target.into(),
        }
    }

    /// Builds an [`ConvertError::InvalidParameters`].
    pub fn invalid_params(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Attributes this error to a column.
    #[must_use]
    pub fn in_column(self, column: impl Into<String>) -> Self {
        Self::Column {
            column: column.into(),
            source: Box::new(self),
        }
    }

    /// The error with any column attribution removed.
    #[must_use]
    pub fn root(&self) -> &ConvertError {
        match self {
            Self::Column { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the root cause is an unsupported scalar type.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self.root(), Self::UnsupportedType { .. })
    }
}
