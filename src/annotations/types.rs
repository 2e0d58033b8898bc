//! Persisted annotation record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::anchor::SerializedAnchor;

/// A highlight with its comment, as handed to persistence
///
/// `range_selector` is the anchor's JSON text, carried opaquely. The offsets
/// are mirrored next to it for listing without a parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnnotation {
    /// Highlight id; matches the marker's id attribute
    pub id: String,
    /// Page the highlight belongs to (URL or file name)
    pub page: String,
    /// The user's comment
    pub text: String,
    pub range_selector: String,
    pub range_start: usize,
    pub range_end: usize,
    pub created_at: DateTime<Utc>,
}

impl StoredAnnotation {
    /// Build a record for a freshly captured anchor
    pub fn new(
        id: impl Into<String>,
        page: impl Into<String>,
        text: impl Into<String>,
        anchor: &SerializedAnchor,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: id.into(),
            page: page.into(),
            text: text.into(),
            range_selector: anchor.to_selector()?,
            range_start: anchor.start_offset,
            range_end: anchor.end_offset,
            created_at: Utc::now(),
        })
    }

    /// Parse the stored selector back into an anchor
    pub fn anchor(&self) -> Result<SerializedAnchor, serde_json::Error> {
        SerializedAnchor::from_selector(&self.range_selector)
    }
}
