//! Generic tree conversion.
//!
//! [`convert`] walks a [`TypeNode`] depth-first, hands every leaf to a
//! caller-supplied function, and combines converted children with an
//! [`Assembler`]. The same walk serves three output modes:
//!
//! - [`TreeAssembler`] rebuilds a [`TypeNode`] (grammar-to-grammar on trees)
//! - [`TextAssembler`](crate::printer::TextAssembler) flattens straight to a
//!   type string in some grammar
//! - target-specific assemblers build native type objects by calling their
//!   constructors on converted children
//!
//! Struct fields are visited in declaration order and reach the assembler
//! positionally, so native constructors see columns in the parsed order.

use std::marker::PhantomData;

use crate::node::{ListVariant, Scalar, TypeNode};

/// Strategy for combining converted children into a parent.
pub trait Assembler {
    /// The converted representation of one node.
    type Output;
    /// Error raised by the leaf function or the assembler.
    type Error;

    /// Wraps a converted element in a list of the given variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot represent the list.
    fn list(
        &mut self,
        variant: ListVariant,
        element: Self::Output,
    ) -> Result<Self::Output, Self::Error>;

    /// Combines converted fields, in declaration order, into a struct.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot represent the struct.
    fn structure(
        &mut self,
        fields: Vec<(String, Self::Output)>,
    ) -> Result<Self::Output, Self::Error>;
}

/// Converts a tree using `leaf` for scalars and `assembler` for compounds.
///
/// The leaf function is the sole authority on scalar translation; its
/// result is used verbatim. The first error from either side aborts the walk.
/// Recursion follows the depth of `node`, which [`crate::parse`] caps at
/// [`crate::DEFAULT_MAX_DEPTH`].
///
/// # Errors
///
/// Propagates the first error raised by `leaf` or `assembler`.
pub fn convert<A, F>(node: &TypeNode, leaf: &mut F, assembler: &mut A) -> Result<A::Output, A::Error>
where
    A: Assembler,
    F: FnMut(&Scalar) -> Result<A::Output, A::Error>,
{
    match node {
        TypeNode::Scalar(scalar) => leaf(scalar),
        TypeNode::List { element, variant } => {
            let element = convert(element, &mut *leaf, &mut *assembler)?;
            assembler.list(*variant, element)
        }
        TypeNode::Struct { fields } => {
            let mut converted = Vec::with_capacity(fields.len());
            for (name, value) in fields {
                converted.push((name.clone(), convert(value, &mut *leaf, &mut *assembler)?));
            }
            assembler.structure(converted)
        }
    }
}

/// Rebuilds a [`TypeNode`] tree with every leaf replaced.
#[derive(Debug)]
pub struct TreeAssembler<E> {
    _error: PhantomData<fn() -> E>,
}

impl<E> TreeAssembler<E> {
    /// Creates a tree assembler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _error: PhantomData,
        }
    }
}

impl<E> Default for TreeAssembler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Assembler for TreeAssembler<E> {
    type Output = TypeNode;
    type Error = E;

    fn list(&mut self, variant: ListVariant, element: TypeNode) -> Result<TypeNode, E> {
        Ok(TypeNode::List {
            element: Box::new(element),
            variant,
        })
    }

    fn structure(&mut self, fields: Vec<(String, TypeNode)>) -> Result<TypeNode, E> {
        Ok(TypeNode::Struct { fields })
    }
}

/// Replaces every scalar in `node` with the node returned by `leaf`.
///
/// # Errors
///
/// Propagates the first error raised by `leaf`.
pub fn map_scalars<E, F>(node: &TypeNode, mut leaf: F) -> Result<TypeNode, E>
where
    F: FnMut(&Scalar) -> Result<TypeNode, E>,
{
    convert(node, &mut leaf, &mut TreeAssembler::new())
}
