//! Errors raised while encoding or validating scene buffers

use thiserror::Error;

/// Structural problems found in a primitive/operation layout.
///
/// Every variant is a precondition violation: a layout that produces one of
/// these must never reach the evaluator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A primitive record carries a kind code outside the known range
    #[error("primitive {index} has unknown kind code {code}")]
    UnknownPrimitiveKind { index: usize, code: u32 },

    /// An operation record carries a kind code outside the known range
    #[error("operation {index} has unknown kind code {code}")]
    UnknownOperationKind { index: usize, code: u32 },

    /// A leaf references a primitive that does not exist
    #[error("operation {node} references missing primitive {child} ({count} primitives)")]
    DanglingPrimitive { node: usize, child: u32, count: usize },

    /// A binary operation references an operation that does not exist
    #[error("operation {node} references missing operation {child} ({count} operations)")]
    DanglingOperation { node: usize, child: u32, count: usize },

    /// Following child links from `node` eventually leads back to it
    #[error("operation {node} is part of a cycle")]
    Cycle { node: usize },

    /// A non-leaf operation is the child of more than one parent
    #[error("operation {node} is referenced by {parents} parents; only leaves may be shared")]
    SharedNode { node: usize, parents: usize },

    /// The requested root is not a valid operation index
    #[error("root {root} is out of range ({count} operations)")]
    RootOutOfRange { root: u32, count: usize },

    /// The tree nests deeper than the evaluator supports
    #[error("composition tree depth {depth} exceeds the limit of {limit}")]
    TooDeep { depth: usize, limit: usize },
}
