//! Serialized anchor and applied highlight types

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;
use crate::path::StructuralPath;

/// The persisted description of a text span
///
/// Offsets are half-open `[start_offset, end_offset)` character positions in
/// the text content of the element each path points at. Serialized with
/// camelCase keys and paths in their text form:
///
/// ```text
/// {"startPath":"/html[1]/body[1]/p[1]","startOffset":10,
///  "endPath":"/html[1]/body[1]/p[1]","endOffset":20}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedAnchor {
    pub start_path: StructuralPath,
    pub start_offset: usize,
    pub end_path: StructuralPath,
    pub end_offset: usize,
}

impl SerializedAnchor {
    pub fn new(
        start_path: StructuralPath,
        start_offset: usize,
        end_path: StructuralPath,
        end_offset: usize,
    ) -> Self {
        Self {
            start_path,
            start_offset,
            end_path,
            end_offset,
        }
    }

    /// Both boundaries address the same element
    pub fn is_single_target(&self) -> bool {
        self.start_path == self.end_path
    }

    /// The opaque string handed to persistence
    pub fn to_selector(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_selector(selector: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(selector)
    }
}

/// A marker currently wrapping text on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedHighlight {
    /// Unique for the lifetime of the page
    pub id: String,
    /// Comment shown when hovering the marker
    pub annotation_text: String,
    /// The marker element
    pub marker: NodeId,
    /// Text wrapped by the marker at creation time
    pub text: String,
}
