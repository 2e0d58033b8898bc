//! Anchor engine
//!
//! Turns a selection into a [`SerializedAnchor`], resolves anchors back to
//! live ranges, and wraps resolved ranges in highlight markers.
//!
//! Offsets in an anchor count characters of the *path target's* text
//! content, not of the text node the boundary sat in. Markers are
//! transparent to paths, so an anchor captured next to existing highlights
//! resolves the same way before and after they are removed.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::ids::{IdGenerator, UuidGenerator};
use super::types::{AppliedHighlight, SerializedAnchor};
use crate::annotations::StoredAnnotation;
use crate::dom::{BoundaryPoint, Document, NodeId, Range};
use crate::error::{AnchorError, Result};
use crate::highlight::{
    create_marker, enclosing_marker, marker_id, unwrap_marker, MarkerConfig, PagePoint, Tooltip,
    TooltipSurface,
};
use crate::path::{PathResolver, StructuralPath};
use crate::selection::Selection;

/// Which text node wins when an offset sits between two of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bias {
    /// The later node, so a start never lands at the end of a node
    Start,
    /// The earlier node, so an end never lands at the start of a node
    End,
}

/// Outcome of re-applying stored annotations to a page
#[derive(Debug, Default)]
pub struct RehydrationReport {
    /// Ids of the highlights now on the page
    pub applied: Vec<String>,
    /// Annotations that could not be placed
    pub failed: Vec<RehydrationFailure>,
}

impl RehydrationReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One annotation the batch skipped
#[derive(Debug)]
pub struct RehydrationFailure {
    pub id: String,
    pub error: AnchorError,
}

/// Captures, resolves and applies highlight anchors on one page
pub struct AnchorEngine {
    config: MarkerConfig,
    resolver: PathResolver,
    ids: Box<dyn IdGenerator>,
    applied: HashMap<String, AppliedHighlight>,
    tooltip: TooltipSurface,
}

impl std::fmt::Debug for AnchorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorEngine")
            .field("config", &self.config)
            .field("applied", &self.applied.len())
            .finish()
    }
}

impl AnchorEngine {
    /// An engine minting random v4 UUIDs
    pub fn new(config: MarkerConfig) -> Self {
        Self::with_id_generator(config, UuidGenerator)
    }

    pub fn with_id_generator(config: MarkerConfig, ids: impl IdGenerator + 'static) -> Self {
        let resolver =
            PathResolver::with_transparent_markers(config.tag.clone(), config.id_attribute.clone());
        let tooltip = TooltipSurface::new(config.tooltip_offset_y);
        Self {
            config,
            resolver,
            ids: Box::new(ids),
            applied: HashMap::new(),
            tooltip,
        }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Describe the selection's first range as a durable anchor
    ///
    /// Returns `None` for an empty or collapsed selection, or one that
    /// covers only whitespace. Leading and trailing whitespace is not part
    /// of the anchor. Never mutates the document.
    pub fn capture(&self, doc: &Document, selection: &Selection) -> Option<SerializedAnchor> {
        if selection.is_collapsed() {
            return None;
        }
        let range = selection.range_at(0)?.trim_whitespace(doc)?;

        let (start_path, start_offset) = self.describe(doc, range.start())?;
        let (end_path, end_offset) = self.describe(doc, range.end())?;
        Some(SerializedAnchor::new(
            start_path,
            start_offset,
            end_path,
            end_offset,
        ))
    }

    fn describe(&self, doc: &Document, point: BoundaryPoint) -> Option<(StructuralPath, usize)> {
        let target = self.resolver.addressable(doc, point.node);
        let before = Range::new(doc, BoundaryPoint::new(target, 0), point).ok()?;
        let offset = before.text(doc).chars().count();
        Some((self.resolver.compute_path(doc, target), offset))
    }

    /// Resolve an anchor, reporting why it failed
    pub fn try_resolve(&self, doc: &Document, anchor: &SerializedAnchor) -> Result<Range> {
        let start = self.locate(doc, &anchor.start_path, anchor.start_offset, Bias::Start)?;
        let end = self.locate(doc, &anchor.end_path, anchor.end_offset, Bias::End)?;
        Range::new(doc, start, end).map_err(AnchorError::InvalidRange)
    }

    /// Resolve an anchor; failures are logged and yield `None`
    pub fn resolve(&self, doc: &Document, anchor: &SerializedAnchor) -> Option<Range> {
        match self.try_resolve(doc, anchor) {
            Ok(range) => Some(range),
            Err(e) => {
                warn!("Could not resolve anchor at {}: {}", anchor.start_path, e);
                None
            }
        }
    }

    fn locate(
        &self,
        doc: &Document,
        path: &StructuralPath,
        offset: usize,
        bias: Bias,
    ) -> Result<BoundaryPoint> {
        let target = self.resolver.resolve_path(doc, path)?;
        let length = doc.text_length(target);
        if offset > length {
            return Err(AnchorError::OffsetOutOfRange {
                path: path.to_string(),
                offset,
                length,
            });
        }

        let mut consumed = 0;
        let mut last = None;
        for node in doc.descendants(target) {
            let Some(text) = doc.text(node) else {
                continue;
            };
            let len = text.chars().count();
            if len == 0 {
                continue;
            }
            let fits = match bias {
                Bias::Start => offset < consumed + len,
                Bias::End => offset <= consumed + len,
            };
            if fits {
                return Ok(BoundaryPoint::new(node, offset - consumed));
            }
            consumed += len;
            last = Some((node, len));
        }

        // offset equals the full length, or the target has no text at all
        Ok(match last {
            Some((node, len)) => BoundaryPoint::new(node, len),
            None => BoundaryPoint::new(target, 0),
        })
    }

    /// Wrap `range` in a new marker with a freshly minted id
    pub fn apply_highlight(
        &mut self,
        doc: &mut Document,
        range: &Range,
        annotation_text: &str,
    ) -> Result<AppliedHighlight> {
        self.check_overlap(doc, range)?;
        let id = self.ids.next_id()?;
        self.wrap(doc, range, &id, annotation_text)
    }

    /// Wrap `range` in a marker carrying a known id, e.g. one read back
    /// from storage
    pub fn apply_highlight_with_id(
        &mut self,
        doc: &mut Document,
        range: &Range,
        id: &str,
        annotation_text: &str,
    ) -> Result<AppliedHighlight> {
        if self.applied.contains_key(id) || self.find_marker(doc, id).is_some() {
            return Err(AnchorError::AlreadyApplied(id.to_string()));
        }
        self.check_overlap(doc, range)?;
        self.wrap(doc, range, id, annotation_text)
    }

    fn check_overlap(&self, doc: &Document, range: &Range) -> Result<()> {
        let boundaries = [range.start().node, range.end().node];
        let covered = range.text_segments(doc).into_iter().map(|segment| segment.node);
        for node in boundaries.into_iter().chain(covered) {
            if let Some(marker) = enclosing_marker(doc, &self.config, node) {
                let id = marker_id(doc, &self.config, marker).unwrap_or_default();
                return Err(AnchorError::OverlapsHighlight(id.to_string()));
            }
        }
        Ok(())
    }

    fn wrap(
        &mut self,
        doc: &mut Document,
        range: &Range,
        id: &str,
        annotation_text: &str,
    ) -> Result<AppliedHighlight> {
        let text = range.text(doc);
        let marker = create_marker(doc, &self.config, id, annotation_text)
            .map_err(AnchorError::WrapFailed)?;
        range
            .hoisted(doc)
            .surround_contents(doc, marker)
            .map_err(AnchorError::WrapFailed)?;

        let highlight = AppliedHighlight {
            id: id.to_string(),
            annotation_text: annotation_text.to_string(),
            marker,
            text,
        };
        self.applied.insert(highlight.id.clone(), highlight.clone());
        debug!("Applied highlight {} over {:?}", id, highlight.text);
        Ok(highlight)
    }

    fn is_marker_for(&self, doc: &Document, node: NodeId, id: &str) -> bool {
        doc.get(node).is_some()
            && marker_id(doc, &self.config, node) == Some(id)
            && doc.is_attached(node)
    }

    fn find_marker(&self, doc: &Document, id: &str) -> Option<NodeId> {
        doc.descendants(doc.root())
            .find(|&node| marker_id(doc, &self.config, node) == Some(id))
    }

    /// Unwrap the marker with this id and merge the text around it
    ///
    /// Unknown ids are a no-op. Returns whether a marker was removed.
    pub fn remove_highlight(&mut self, doc: &mut Document, id: &str) -> bool {
        // the recorded node may belong to an earlier copy of the page
        let marker = self
            .applied
            .remove(id)
            .map(|highlight| highlight.marker)
            .filter(|&node| self.is_marker_for(doc, node, id))
            .or_else(|| self.find_marker(doc, id));
        let Some(marker) = marker else {
            debug!("No highlight {} to remove", id);
            return false;
        };

        self.tooltip.hide_for(id);
        match unwrap_marker(doc, marker) {
            Ok(()) => {
                debug!("Removed highlight {}", id);
                true
            }
            Err(e) => {
                warn!("Failed to unwrap highlight {}: {}", id, e);
                false
            }
        }
    }

    /// Remove every highlight this engine applied; returns how many
    pub fn teardown(&mut self, doc: &mut Document) -> usize {
        let mut ids: Vec<String> = self.applied.keys().cloned().collect();
        ids.sort();
        let removed = ids
            .iter()
            .filter(|id| self.remove_highlight(doc, id))
            .count();
        self.tooltip.hide();
        removed
    }

    /// Re-apply stored annotations after a page load
    ///
    /// Each annotation is resolved and applied on its own; a failure is
    /// recorded and the batch moves on. Stored ids are kept on the markers.
    pub fn rehydrate(
        &mut self,
        doc: &mut Document,
        annotations: &[StoredAnnotation],
    ) -> RehydrationReport {
        let mut report = RehydrationReport::default();
        for annotation in annotations {
            match self.rehydrate_one(doc, annotation) {
                Ok(highlight) => report.applied.push(highlight.id),
                Err(error) => {
                    warn!("Skipping annotation {}: {}", annotation.id, error);
                    report.failed.push(RehydrationFailure {
                        id: annotation.id.clone(),
                        error,
                    });
                }
            }
        }
        debug!(
            "Rehydrated {} of {} annotations",
            report.applied_count(),
            annotations.len()
        );
        report
    }

    fn rehydrate_one(
        &mut self,
        doc: &mut Document,
        annotation: &StoredAnnotation,
    ) -> Result<AppliedHighlight> {
        let anchor = annotation.anchor()?;
        let range = self.try_resolve(doc, &anchor)?;
        self.apply_highlight_with_id(doc, &range, &annotation.id, &annotation.text)
    }

    pub fn highlight(&self, id: &str) -> Option<&AppliedHighlight> {
        self.applied.get(id)
    }

    pub fn highlights(&self) -> impl Iterator<Item = &AppliedHighlight> {
        self.applied.values()
    }

    /// Pointer entered `target`; show the comment if it is inside a marker
    pub fn pointer_over(&mut self, doc: &Document, target: NodeId, at: PagePoint) -> Option<&Tooltip> {
        let marker = enclosing_marker(doc, &self.config, target)?;
        let id = marker_id(doc, &self.config, marker)?;
        let text = doc
            .attribute(marker, &self.config.comment_attribute)
            .unwrap_or_default();
        Some(self.tooltip.show(id, text, at))
    }

    /// Pointer left `target` for `related`; hide the tooltip unless the
    /// pointer stays within the same marker
    pub fn pointer_out(&mut self, doc: &Document, target: NodeId, related: Option<NodeId>) {
        let Some(marker) = enclosing_marker(doc, &self.config, target) else {
            return;
        };
        if related.is_some_and(|node| doc.contains(marker, node)) {
            return;
        }
        if let Some(id) = marker_id(doc, &self.config, marker) {
            self.tooltip.hide_for(id);
        }
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.current()
    }
}
