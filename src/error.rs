//! Error types for the anchor engine
//!
//! Every variant is a local, recoverable failure of a single anchor. Batch
//! callers collect them and move on to the next anchor.

use thiserror::Error;

use crate::anchor::IdError;
use crate::dom::DomError;
use crate::path::PathError;

/// Result type for anchor operations
pub type Result<T> = std::result::Result<T, AnchorError>;

/// Anchor engine error type
#[derive(Debug, Error)]
pub enum AnchorError {
    /// A boundary path no longer matches the page
    #[error("Unresolvable path: {0}")]
    Unresolvable(#[from] PathError),

    /// The target's text shrank since capture
    #[error("Offset {offset} out of range for {path} (text length {length})")]
    OffsetOutOfRange {
        path: String,
        offset: usize,
        length: usize,
    },

    /// Boundaries resolved but do not form a valid range
    #[error("Invalid range: {0}")]
    InvalidRange(DomError),

    /// The range cannot be wrapped by a single marker element
    #[error("Range cannot be wrapped: {0}")]
    WrapFailed(DomError),

    /// The range intersects a highlight that is already applied
    #[error("Range overlaps highlight {0}")]
    OverlapsHighlight(String),

    /// A marker with this id is already on the page
    #[error("Highlight {0} is already applied")]
    AlreadyApplied(String),

    /// No safe identifier could be minted
    #[error("Identifier generator unavailable: {0}")]
    IdUnavailable(#[from] IdError),

    /// A stored range selector is not a valid anchor
    #[error("Invalid range selector: {0}")]
    InvalidSelector(#[from] serde_json::Error),
}

impl AnchorError {
    /// True for failures caused by the page changing since capture
    pub fn is_drift(&self) -> bool {
        matches!(
            self,
            AnchorError::Unresolvable(PathError::NotFound { .. })
                | AnchorError::OffsetOutOfRange { .. }
                | AnchorError::InvalidRange(_)
        )
    }
}
