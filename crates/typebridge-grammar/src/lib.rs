//! # typebridge grammar
//!
//! The complex-type grammar engine behind typebridge's converters.
//!
//! This crate provides:
//! - [`BracketSplitter`]: top-level splitting that respects `[]`, `()`, `<>`
//! - [`parse`] / [`parse_with`]: recursive-descent parsing into a [`TypeNode`]
//! - [`convert`]: a generic tree walk over a pluggable leaf function and
//!   [`Assembler`] strategy
//! - [`print`]: serialization into any [`Grammar`]
//!
//! ```text
//! "struct<a:timestamp(s),b:list<int64>>"
//!        │ parse_with(agnostic)
//!        ▼
//!   TypeNode::Struct ──convert(leaf, assembler)──▶ TypeNode / String / native type
//!        │ print(hive)
//!        ▼
//! "struct<a:timestamp(s),b:array<int64>>"
//! ```
//!
//! Everything here is pure: no I/O, no shared mutable state.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod convert;
pub mod error;
pub mod grammar;
pub mod node;
pub mod parser;
pub mod printer;
pub mod splitter;

pub use convert::{convert, map_scalars, Assembler, TreeAssembler};
pub use error::{ParseError, ParseResult};
pub use grammar::{Compound, Grammar};
pub use node::{ListVariant, Scalar, ScalarParam, TypeNode};
pub use parser::{parse, parse_scalar, parse_with, TypeParser, DEFAULT_MAX_DEPTH};
pub use printer::{format_scalar, print, TextAssembler};
pub use splitter::{check_balanced, split_top_level, BracketSplitter};
