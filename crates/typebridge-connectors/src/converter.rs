//! The metadata converter trait.

use crate::config::ConverterConfig;
use crate::error::ConvertResult;
use crate::metadata::{Column, Metadata};
use crate::warning::{LossyConversionWarning, WarningCollector};
use crate::GrammarAdapter;

/// A converted value together with the warnings raised producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted<T> {
    /// The converted value.
    pub value: T,
    /// Lossy conversions encountered; empty when warnings are ignored.
    pub warnings: Vec<LossyConversionWarning>,
}

impl<T> Converted<T> {
    /// Pairs a value with its warnings.
    #[must_use]
    pub fn new(value: T, warnings: Vec<LossyConversionWarning>) -> Self {
        Self { value, warnings }
    }

    /// Discards the warnings.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Converts agnostic [`Metadata`] to and from one target
/// schema representation.
pub trait MetadataConverter {
    /// The target schema representation.
    type Output;

    /// Target name used in errors and warnings.
    fn target(&self) -> &str;

    /// The converter's settings.
    fn config(&self) -> &ConverterConfig;

    /// Converts agnostic metadata into the target representation.
    ///
    /// # Errors
    ///
    /// Fails if the metadata is invalid or any column type has no
    /// representation in the target.
    fn generate_from_meta(&self, metadata: &Metadata) -> ConvertResult<Converted<Self::Output>>;

    /// Converts the target representation back into agnostic metadata.
    ///
    /// # Errors
    ///
    /// Fails if any column type has no agnostic counterpart.
    fn generate_to_meta(&self, output: &Self::Output) -> ConvertResult<Converted<Metadata>>;
}

/// Exports one column's agnostic type through `adapter`, attributing
/// warnings and errors to the column.
pub(crate) fn export_column_type(
    adapter: &GrammarAdapter,
    column: &Column,
    warnings: &mut WarningCollector,
) -> ConvertResult<String> {
    warnings.set_column(Some(column.name.as_str()));
    adapter
        .to_target(&column.type_name, warnings)
        .map_err(|e| e.in_column(&column.name))
}

/// Imports one target column type through `adapter`, attributing warnings
/// and errors to the column.
pub(crate) fn import_column_type(
    adapter: &GrammarAdapter,
    column: &str,
    type_name: &str,
    warnings: &mut WarningCollector,
) -> ConvertResult<String> {
    warnings.set_column(Some(column));
    adapter
        .to_agnostic(type_name, warnings)
        .map_err(|e| e.in_column(column))
}
