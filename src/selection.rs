//! Selection source
//!
//! The host page's live selection: an ordered list of ranges, of which the
//! anchor engine only ever looks at the first.

use crate::dom::{Document, Range};

/// A user's text selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ranges: Vec<Range>,
}

impl Selection {
    /// An empty selection
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_range(range: Range) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    pub fn add_range(&mut self, range: Range) {
        self.ranges.push(range);
    }

    pub fn remove_all_ranges(&mut self) {
        self.ranges.clear();
    }

    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn range_at(&self, index: usize) -> Option<&Range> {
        self.ranges.get(index)
    }

    /// True with no ranges, or when the first range is collapsed
    pub fn is_collapsed(&self) -> bool {
        self.ranges.first().map_or(true, Range::is_collapsed)
    }

    /// Concatenated text of every range, like `Selection.toString()`
    pub fn text(&self, doc: &Document) -> String {
        self.ranges.iter().map(|range| range.text(doc)).collect()
    }

    /// True when the selection shows no visible text
    pub fn is_blank(&self, doc: &Document) -> bool {
        self.text(doc).trim().is_empty()
    }
}
