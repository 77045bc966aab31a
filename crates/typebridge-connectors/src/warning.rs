//! Lossy-conversion warnings.
//!
//! A conversion that has a representation in the target but loses
//! information is not an error. It produces exactly one
//! [`LossyConversionWarning`] per offending leaf, recorded by a
//! [`WarningCollector`] and emitted as a `tracing` event, unless the caller
//! asked for warnings to be ignored.

use std::fmt;

/// One lossy scalar conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossyConversionWarning {
    /// The scalar as written in the source grammar.
    pub source_type: String,
    /// The scalar as written in the target grammar.
    pub target_type: String,
    /// The adapter or converter performing the conversion.
    pub target: String,
    /// The column being converted, when known.
    pub column: Option<String>,
}

impl fmt::Display for LossyConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not fully supported by {}; converted to '{}'",
            self.source_type, self.target, self.target_type
        )?;
        if let Some(column) = &self.column {
            write!(f, " (column '{column}')")?;
        }
        Ok(())
    }
}

/// Collects lossy-conversion warnings for one conversion call.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    ignore: bool,
    column: Option<String>,
    warnings: Vec<LossyConversionWarning>,
}

impl WarningCollector {
    /// Creates a collector that records warnings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collector that drops every warning.
    #[must_use]
    pub fn ignoring() -> Self {
        Self {
            ignore: true,
            ..Self::default()
        }
    }

    /// Whether warnings are being dropped.
    #[must_use]
    pub fn is_ignoring(&self) -> bool {
        self.ignore
    }

    /// Sets the column attributed to subsequent warnings.
    pub fn set_column(&mut self, column: Option<&str>) {
        self.column = column.map(ToOwned::to_owned);
    }

    /// Records one lossy conversion.
    pub fn record(
        &mut self,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        target: &str,
    ) {
        if self.ignore {
            return;
        }
        let warning = LossyConversionWarning {
            source_type: source_type.into(),
            target_type: target_type.into(),
            target: target.to_string(),
            column: self.column.clone(),
        };
        tracing::warn!(
            source_type = %warning.source_type,
            target_type = %warning.target_type,
            target = %warning.target,
            column = ?warning.column,
            "lossy type conversion"
        );
        self.warnings.push(warning);
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[LossyConversionWarning] {
        &self.warnings
    }

    /// Number of warnings recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Whether no warnings were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consumes the collector, returning its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<LossyConversionWarning> {
        self.warnings
    }
}
