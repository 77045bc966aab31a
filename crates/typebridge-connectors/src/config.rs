//! Converter configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::warning::WarningCollector;

/// Option key controlling lossy-conversion warnings (`warn` | `ignore`).
pub const WARNINGS_KEY: &str = "warnings";
/// Option key controlling duplicate struct field names (`reject` | `allow`).
pub const DUPLICATE_FIELDS_KEY: &str = "struct.duplicate_fields";
/// Option key for column nullability when metadata leaves it unset.
pub const DEFAULT_NULLABLE_KEY: &str = "nullable.default";

/// Settings shared by every metadata converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Drop lossy-conversion warnings instead of recording them.
    pub ignore_warnings: bool,

    /// Reject struct types that repeat a field name.
    pub reject_duplicate_fields: bool,

    /// Nullability of columns that do not state one.
    pub default_nullable: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ignore_warnings: false,
            reject_duplicate_fields: true,
            default_nullable: true,
        }
    }
}

impl ConverterConfig {
    /// Builds a config from `WITH`-style string options, starting from the
    /// defaults. Keys and values are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidConfig`] for an unknown key or a value
    /// the key does not accept.
    pub fn from_options(options: &HashMap<String, String>) -> ConvertResult<Self> {
        let mut config = Self::default();
        for (key, value) in options {
            let value = value.trim().to_lowercase();
            match key.trim().to_lowercase().as_str() {
                WARNINGS_KEY => {
                    config.ignore_warnings = match value.as_str() {
                        "ignore" => true,
                        "warn" => false,
                        _ => return Err(invalid(key, "expected 'warn' or 'ignore'", &value)),
                    };
                }
                DUPLICATE_FIELDS_KEY => {
                    config.reject_duplicate_fields = match value.as_str() {
                        "reject" => true,
                        "allow" => false,
                        _ => return Err(invalid(key, "expected 'reject' or 'allow'", &value)),
                    };
                }
                DEFAULT_NULLABLE_KEY => {
                    config.default_nullable = value
                        .parse()
                        .map_err(|_| invalid(key, "expected 'true' or 'false'", &value))?;
                }
                _ => {
                    return Err(ConvertError::InvalidConfig {
                        key: key.clone(),
                        message: "unknown option".into(),
                    })
                }
            }
        }
        Ok(config)
    }

    /// Sets [`ConverterConfig::ignore_warnings`].
    #[must_use]
    pub fn with_ignore_warnings(mut self, ignore: bool) -> Self {
        self.ignore_warnings = ignore;
        self
    }

    /// Sets [`ConverterConfig::default_nullable`].
    #[must_use]
    pub fn with_default_nullable(mut self, nullable: bool) -> Self {
        self.default_nullable = nullable;
        self
    }

    /// Sets [`ConverterConfig::reject_duplicate_fields`].
    #[must_use]
    pub fn with_reject_duplicate_fields(mut self, reject: bool) -> Self {
        self.reject_duplicate_fields = reject;
        self
    }

    /// A fresh collector honouring [`ConverterConfig::ignore_warnings`].
    #[must_use]
    pub fn warning_collector(&self) -> WarningCollector {
        if self.ignore_warnings {
            WarningCollector::ignoring()
        } else {
            WarningCollector::new()
        }
    }
}

fn invalid(key: &str, expected: &str, got: &str) -> ConvertError {
    ConvertError::InvalidConfig {
        key: key.to_string(),
        message: format!("{expected}, got '{got}'"),
    }
}
