//! Document tree error types

use thiserror::Error;

/// Errors raised by tree and range operations
///
/// These mirror the exceptions a live DOM throws (`IndexSizeError`,
/// `HierarchyRequestError`, `InvalidStateError`), surfaced as values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// Markup could not be parsed into a tree
    #[error("Parse error: {0}")]
    Parse(String),

    /// Offset past the end of a node
    #[error("Offset {offset} exceeds node length {length}")]
    IndexSize { offset: usize, length: usize },

    /// Insertion would produce an invalid tree
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// Operation needs an element node
    #[error("Node is not an element")]
    NotAnElement,

    /// Operation needs a text node
    #[error("Node is not a text node")]
    NotText,

    /// Node is not connected to the document root
    #[error("Node is detached from the document")]
    Detached,

    /// Range boundaries cannot support the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
