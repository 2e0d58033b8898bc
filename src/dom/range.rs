//! Live ranges
//!
//! A [`Range`] is a pair of boundary points following the DOM convention: in
//! a text node the offset counts characters, in any other node it counts
//! children. Ranges do not track later mutations; re-create them after the
//! tree changes.

use std::cmp::Ordering;

use super::error::DomError;
use super::tree::{Document, NodeId};

/// A `(node, offset)` position in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// The covered part `[from, to)` of one text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment {
    pub node: NodeId,
    pub from: usize,
    pub to: usize,
}

/// A contiguous span of the document between two boundary points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: BoundaryPoint,
    end: BoundaryPoint,
}

impl Range {
    /// Build a range, rejecting offsets past a node's length and
    /// boundaries in the wrong order
    pub fn new(doc: &Document, start: BoundaryPoint, end: BoundaryPoint) -> Result<Self, DomError> {
        check_offset(doc, start)?;
        check_offset(doc, end)?;
        if compare_points(doc, start, end)? == Ordering::Greater {
            return Err(DomError::InvalidState(
                "range end precedes its start".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// A range covering `[start, end)` inside one node
    pub fn within(doc: &Document, node: NodeId, start: usize, end: usize) -> Result<Self, DomError> {
        Self::new(
            doc,
            BoundaryPoint::new(node, start),
            BoundaryPoint::new(node, end),
        )
    }

    /// A range covering every child of `node`
    pub fn select_contents(doc: &Document, node: NodeId) -> Result<Self, DomError> {
        Self::within(doc, node, 0, doc.node_length(node))
    }

    pub fn start(&self) -> BoundaryPoint {
        self.start
    }

    pub fn end(&self) -> BoundaryPoint {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Deepest node containing both boundary points
    pub fn common_ancestor(&self, doc: &Document) -> NodeId {
        let mut candidate = self.start.node;
        loop {
            if doc.contains(candidate, self.end.node) {
                return candidate;
            }
            match doc.parent(candidate) {
                Some(parent) => candidate = parent,
                None => return candidate,
            }
        }
    }

    /// The text the range covers, like `Range.toString()`
    pub fn text(&self, doc: &Document) -> String {
        let mut out = String::new();
        for segment in self.text_segments(doc) {
            if let Some(text) = doc.text(segment.node) {
                out.extend(text.chars().skip(segment.from).take(segment.to - segment.from));
            }
        }
        out
    }

    /// The non-empty pieces of text nodes covered by the range, in tree order
    pub fn text_segments(&self, doc: &Document) -> Vec<TextSegment> {
        let mut segments = Vec::new();
        for node in doc.descendants(self.common_ancestor(doc)) {
            let Some(text) = doc.text(node) else {
                continue;
            };
            let from = if node == self.start.node {
                self.start.offset
            } else {
                0
            };
            let to = if node == self.end.node {
                self.end.offset
            } else {
                text.chars().count()
            };
            let inside = self.contains_point(doc, BoundaryPoint::new(node, from))
                && self.contains_point(doc, BoundaryPoint::new(node, to));
            if inside && from < to {
                segments.push(TextSegment { node, from, to });
            }
        }
        segments
    }

    /// Shrink the range so it starts and ends on non-whitespace characters
    ///
    /// Boundaries always land inside text nodes afterwards. Returns `None`
    /// when the range covers no visible text.
    pub fn trim_whitespace(&self, doc: &Document) -> Option<Range> {
        let segments = self.text_segments(doc);

        let start = segments.iter().find_map(|segment| {
            let text = doc.text(segment.node)?;
            text.chars()
                .enumerate()
                .skip(segment.from)
                .take(segment.to - segment.from)
                .find(|(_, ch)| !ch.is_whitespace())
                .map(|(index, _)| BoundaryPoint::new(segment.node, index))
        })?;
        let end = segments.iter().rev().find_map(|segment| {
            let text = doc.text(segment.node)?;
            text.chars()
                .enumerate()
                .skip(segment.from)
                .take(segment.to - segment.from)
                .filter(|(_, ch)| !ch.is_whitespace())
                .last()
                .map(|(index, _)| BoundaryPoint::new(segment.node, index + 1))
        })?;

        Range::new(doc, start, end).ok()
    }

    /// The same span with each boundary lifted out of nodes it sits at the
    /// very edge of, like `setStartBefore` / `setEndAfter`
    ///
    /// A start at offset 0 moves to just before its node and an end at a
    /// node's length moves to just after it, stopping at the node that holds
    /// the other boundary. The covered text is unchanged, but a range whose
    /// start sits at the front of an inline element can then be wrapped by
    /// [`Range::surround_contents`].
    pub fn hoisted(&self, doc: &Document) -> Range {
        let mut start = self.start;
        while start.offset == 0 && !doc.contains(start.node, self.end.node) {
            let (Some(parent), Some(index)) = (doc.parent(start.node), doc.index_in_parent(start.node))
            else {
                break;
            };
            start = BoundaryPoint::new(parent, index);
        }

        let mut end = self.end;
        while end.offset == doc.node_length(end.node) && !doc.contains(end.node, start.node) {
            let (Some(parent), Some(index)) = (doc.parent(end.node), doc.index_in_parent(end.node))
            else {
                break;
            };
            end = BoundaryPoint::new(parent, index + 1);
        }

        Range::new(doc, start, end).unwrap_or(*self)
    }

    fn contains_point(&self, doc: &Document, point: BoundaryPoint) -> bool {
        matches!(
            compare_points(doc, self.start, point),
            Ok(Ordering::Less | Ordering::Equal)
        ) && matches!(
            compare_points(doc, point, self.end),
            Ok(Ordering::Less | Ordering::Equal)
        )
    }

    /// Move the range's contents into `wrapper` and put `wrapper` in their
    /// place, like `Range.surroundContents()`
    ///
    /// Text nodes at the boundaries are split as needed. The range must not
    /// partially select any non-text node; otherwise nothing is mutated and
    /// `InvalidState` is returned.
    pub fn surround_contents(&self, doc: &mut Document, wrapper: NodeId) -> Result<(), DomError> {
        if !doc.is_element(wrapper) {
            return Err(DomError::NotAnElement);
        }
        if doc.contains(wrapper, self.start.node) || doc.contains(wrapper, self.end.node) {
            return Err(DomError::HierarchyRequest(
                "wrapper lies inside the range".to_string(),
            ));
        }
        if !doc.is_attached(self.start.node) || !doc.is_attached(self.end.node) {
            return Err(DomError::Detached);
        }

        let start = edge_for(doc, self.start);
        let end = edge_for(doc, self.end);
        let parent = start.parent(doc);
        if parent.is_none() || parent != end.parent(doc) {
            return Err(DomError::InvalidState(
                "range partially selects a non-text node".to_string(),
            ));
        }
        let parent = parent.ok_or(DomError::Detached)?;

        // split the end first so the start offset stays valid when both
        // boundaries sit in the same text node
        let end = end.split(doc)?;
        let start = start.split(doc)?;

        let from = start.index(doc).ok_or(DomError::Detached)?;
        let to = end.index(doc).ok_or(DomError::Detached)?;
        if from > to {
            return Err(DomError::InvalidState("range end precedes its start".to_string()));
        }

        let moved: Vec<NodeId> = doc.children(parent)[from..to].to_vec();
        let reference = doc.children(parent).get(to).copied();
        doc.insert_before(parent, wrapper, reference)?;
        for node in moved {
            doc.append_child(wrapper, node)?;
        }
        Ok(())
    }
}

/// Where a boundary falls relative to its parent's children
#[derive(Debug, Clone, Copy)]
enum Edge {
    /// Just before this node
    Before(NodeId),
    /// Just after this node
    After(NodeId),
    /// After the last child of this node
    End(NodeId),
    /// Inside a text node; needs a split
    Split(NodeId, usize),
}

fn edge_for(doc: &Document, point: BoundaryPoint) -> Edge {
    if let Some(text) = doc.text(point.node) {
        let length = text.chars().count();
        return if point.offset == 0 {
            Edge::Before(point.node)
        } else if point.offset >= length {
            Edge::After(point.node)
        } else {
            Edge::Split(point.node, point.offset)
        };
    }
    match doc.children(point.node).get(point.offset) {
        Some(&child) => Edge::Before(child),
        None => Edge::End(point.node),
    }
}

impl Edge {
    fn parent(&self, doc: &Document) -> Option<NodeId> {
        match *self {
            Edge::Before(node) | Edge::After(node) | Edge::Split(node, _) => doc.parent(node),
            Edge::End(node) => Some(node),
        }
    }

    fn split(self, doc: &mut Document) -> Result<Edge, DomError> {
        match self {
            Edge::Split(node, offset) => Ok(Edge::Before(doc.split_text(node, offset)?)),
            other => Ok(other),
        }
    }

    fn index(&self, doc: &Document) -> Option<usize> {
        match *self {
            Edge::Before(node) => doc.index_in_parent(node),
            Edge::After(node) => doc.index_in_parent(node).map(|i| i + 1),
            Edge::End(node) => Some(doc.children(node).len()),
            Edge::Split(..) => None,
        }
    }
}

fn check_offset(doc: &Document, point: BoundaryPoint) -> Result<(), DomError> {
    let length = doc.node_length(point.node);
    if point.offset > length {
        return Err(DomError::IndexSize {
            offset: point.offset,
            length,
        });
    }
    Ok(())
}

/// Order two boundary points in tree order
pub fn compare_points(
    doc: &Document,
    a: BoundaryPoint,
    b: BoundaryPoint,
) -> Result<Ordering, DomError> {
    let mut a_key = doc.tree_position(a.node).ok_or(DomError::Detached)?;
    let mut b_key = doc.tree_position(b.node).ok_or(DomError::Detached)?;
    a_key.push(a.offset);
    b_key.push(b.offset);
    Ok(a_key.cmp(&b_key))
}

/// Find the `occurrence`-th (0-based) match of `needle` inside a single
/// text node beneath `scope`
pub fn find_text(doc: &Document, scope: NodeId, needle: &str, occurrence: usize) -> Option<Range> {
    if needle.is_empty() {
        return None;
    }
    let mut seen = 0;
    for node in doc.descendants(scope) {
        let Some(text) = doc.text(node) else {
            continue;
        };
        for (byte, _) in text.match_indices(needle) {
            if seen == occurrence {
                let start = text[..byte].chars().count();
                let end = start + needle.chars().count();
                return Range::within(doc, node, start, end).ok();
            }
            seen += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse, to_markup};

    const PAGE: &str = "<body><p>This is a test paragraph with some text that we can highlight.</p><p>Second <b>bold</b> tail</p></body>";

    fn first_text(doc: &Document, index: usize) -> NodeId {
        let p = doc.elements_by_name("p")[index];
        doc.children(p)[0]
    }

    #[test]
    fn test_text_single_node() {
        let doc = parse(PAGE).unwrap();
        let t = first_text(&doc, 0);
        let range = Range::within(&doc, t, 10, 20).unwrap();

        assert_eq!(range.text(&doc), "test parag");
        assert!(!range.is_collapsed());
    }

    #[test]
    fn test_text_across_nodes() {
        let doc = parse(PAGE).unwrap();
        let p = doc.elements_by_name("p")[1];
        let start = doc.children(p)[0];
        let end = doc.children(p)[2];
        let range = Range::new(
            &doc,
            BoundaryPoint::new(start, 3),
            BoundaryPoint::new(end, 3),
        )
        .unwrap();

        assert_eq!(range.text(&doc), "ond bold ta");
        assert_eq!(range.common_ancestor(&doc), p);
    }

    #[test]
    fn test_offset_out_of_range() {
        let doc = parse(PAGE).unwrap();
        let t = first_text(&doc, 0);
        let result = Range::within(&doc, t, 10, 500);
        assert!(matches!(result, Err(DomError::IndexSize { offset: 500, .. })));
    }

    #[test]
    fn test_reversed_boundaries_rejected() {
        let doc = parse(PAGE).unwrap();
        let t = first_text(&doc, 0);
        let result = Range::within(&doc, t, 20, 10);
        assert!(matches!(result, Err(DomError::InvalidState(_))));
    }

    #[test]
    fn test_surround_inside_text_node() {
        let mut doc = parse(PAGE).unwrap();
        let t = first_text(&doc, 0);
        let range = Range::within(&doc, t, 10, 20).unwrap();
        let mark = doc.create_element("mark");

        range.surround_contents(&mut doc, mark).unwrap();

        assert_eq!(doc.text_content(mark), "test parag");
        let p = doc.elements_by_name("p")[0];
        assert_eq!(doc.children(p).len(), 3);
        assert!(to_markup(&doc).contains("This is a <mark>test parag</mark>raph"));
    }

    #[test]
    fn test_surround_whole_text_node() {
        let mut doc = parse("<p>abc</p>").unwrap();
        let p = doc.document_element().unwrap();
        let t = doc.children(p)[0];
        let range = Range::within(&doc, t, 0, 3).unwrap();
        let mark = doc.create_element("mark");

        range.surround_contents(&mut doc, mark).unwrap();

        assert_eq!(to_markup(&doc), "<p><mark>abc</mark></p>");
    }

    #[test]
    fn test_surround_sibling_text_and_element() {
        let mut doc = parse(PAGE).unwrap();
        let p = doc.elements_by_name("p")[1];
        let start = doc.children(p)[0];
        let end = doc.children(p)[2];
        let range = Range::new(
            &doc,
            BoundaryPoint::new(start, 3),
            BoundaryPoint::new(end, 3),
        )
        .unwrap();
        let mark = doc.create_element("mark");

        range.surround_contents(&mut doc, mark).unwrap();

        assert_eq!(
            to_markup(&doc).split("<p>").nth(2),
            Some("Sec<mark>ond <b>bold</b> ta</mark>il</p></body>")
        );
    }

    #[test]
    fn test_surround_partial_element_fails_without_mutation() {
        let mut doc = parse(PAGE).unwrap();
        let before = to_markup(&doc);
        let p = doc.elements_by_name("p")[1];
        let start = doc.children(p)[0];
        let bold_text = doc.children(doc.children(p)[1])[0];
        let range = Range::new(
            &doc,
            BoundaryPoint::new(start, 3),
            BoundaryPoint::new(bold_text, 2),
        )
        .unwrap();
        let mark = doc.create_element("mark");

        let result = range.surround_contents(&mut doc, mark);

        assert!(matches!(result, Err(DomError::InvalidState(_))));
        assert_eq!(to_markup(&doc), before);
    }

    #[test]
    fn test_hoisted_lifts_start_out_of_inline_element() {
        let mut doc = parse(PAGE).unwrap();
        let p = doc.elements_by_name("p")[1];
        let bold_text = doc.children(doc.children(p)[1])[0];
        let tail = doc.children(p)[2];
        let range = Range::new(
            &doc,
            BoundaryPoint::new(bold_text, 0),
            BoundaryPoint::new(tail, 5),
        )
        .unwrap();

        let hoisted = range.hoisted(&doc);
        assert_eq!(hoisted.start(), BoundaryPoint::new(p, 1));
        assert_eq!(hoisted.end(), BoundaryPoint::new(p, 3));
        assert_eq!(hoisted.text(&doc), range.text(&doc));

        let mark = doc.create_element("mark");
        hoisted.surround_contents(&mut doc, mark).unwrap();
        assert!(to_markup(&doc).contains("<p>Second <mark><b>bold</b> tail</mark></p>"));
    }

    #[test]
    fn test_hoisted_stops_at_shared_node() {
        let doc = parse(PAGE).unwrap();
        let t = first_text(&doc, 0);
        let range = Range::within(&doc, t, 0, 4).unwrap();

        assert_eq!(range.hoisted(&doc), range);
    }

    #[test]
    fn test_trim_whitespace_across_nodes() {
        let doc = parse("<div><p>  lead</p><p>tail \n</p></div>").unwrap();
        let div = doc.document_element().unwrap();
        let range = Range::select_contents(&doc, div).unwrap();
        assert_eq!(range.text(&doc), "  leadtail \n");

        let trimmed = range.trim_whitespace(&doc).unwrap();
        assert_eq!(trimmed.text(&doc), "leadtail");
        assert_eq!(trimmed.start().offset, 2);
        assert_eq!(trimmed.end().offset, 4);
    }

    #[test]
    fn test_trim_whitespace_only() {
        let doc = parse("<p>a   b</p>").unwrap();
        let t = first_text(&doc, 0);
        let range = Range::within(&doc, t, 1, 4).unwrap();
        assert!(range.trim_whitespace(&doc).is_none());
    }

    #[test]
    fn test_find_text() {
        let doc = parse(PAGE).unwrap();
        let range = find_text(&doc, doc.root(), "test parag", 0).unwrap();
        assert_eq!(range.start().offset, 10);
        assert_eq!(range.text(&doc), "test parag");

        assert!(find_text(&doc, doc.root(), "missing", 0).is_none());
        assert!(find_text(&doc, doc.root(), "t", 99).is_none());
    }
}
