//! # typebridge connectors
//!
//! Translates agnostic column types and table metadata into target type
//! systems, on top of the grammar engine in `typebridge-grammar`.
//!
//! - [`GrammarAdapter`]: per-target scalar tables driving string and tree
//!   translation, collected in an [`AdapterRegistry`]
//! - [`Metadata`]: the agnostic table envelope
//! - [`MetadataConverter`] implementations: [`ArrowConverter`] (native
//!   `arrow_schema` types), [`HiveConverter`], [`EtlManagerConverter`]
//!
//! Lossy translations are reported as [`LossyConversionWarning`]s and
//! `tracing` events; translations with no target representation fail with
//! [`ConvertError::UnsupportedType`].

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod adapter;
pub mod arrow;
pub mod config;
pub mod converter;
pub mod error;
pub mod etl_manager;
pub mod hive;
pub mod metadata;
pub mod table;
pub mod warning;

pub use adapter::{AdapterRegistry, GrammarAdapter, AGNOSTIC};
pub use arrow::{agnostic_to_arrow, arrow_to_agnostic, ArrowConverter, DataTypeAssembler};
pub use config::ConverterConfig;
pub use converter::{Converted, MetadataConverter};
pub use error::{ConvertError, ConvertResult};
pub use etl_manager::{EtlColumn, EtlManagerConverter, EtlTableMetadata};
pub use hive::{HiveColumn, HiveConverter, HiveTableSpec};
pub use metadata::{Column, Metadata};
pub use table::{MappedScalar, ParamRule, ScalarMapping, ScalarTable};
pub use warning::{LossyConversionWarning, WarningCollector};
