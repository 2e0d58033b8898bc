//! Annotation session
//!
//! One explicitly constructed controller per page. It owns the anchor engine
//! and the store, keeps the pending selection between pointer-up and
//! confirm, and routes every page event through a single [`dispatch`].
//!
//! [`dispatch`]: AnnotationSession::dispatch

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::anchor::{AnchorEngine, AppliedHighlight, RehydrationReport, SerializedAnchor};
use crate::annotations::{AnnotationStore, StoredAnnotation};
use crate::dom::{Document, NodeId};
use crate::highlight::{PagePoint, Tooltip};
use crate::selection::Selection;

/// A captured selection waiting for its comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub anchor: SerializedAnchor,
    /// Selected text, shown in the comment prompt
    pub text: String,
}

/// Page events a host forwards to the session
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// The user released the pointer with this selection live
    PointerUp(Selection),
    PointerOver {
        target: NodeId,
        at: PagePoint,
    },
    PointerOut {
        target: NodeId,
        related: Option<NodeId>,
    },
}

/// What the host should show after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Nothing to show
    Nothing,
    /// Offer to comment on the selected text
    CommentPrompt { text: String },
    Tooltip(Tooltip),
    /// Hide whatever hover UI is visible
    HideTooltip,
}

/// Highlighting lifecycle for one page
pub struct AnnotationSession<S> {
    engine: AnchorEngine,
    store: S,
    page: String,
    enabled: bool,
    pending: Option<PendingSelection>,
}

impl<S: AnnotationStore> AnnotationSession<S> {
    /// A disabled session; call [`AnnotationSession::enable`] to start
    pub fn create(engine: AnchorEngine, store: S, page: impl Into<String>) -> Self {
        Self {
            engine,
            store,
            page: page.into(),
            enabled: false,
            pending: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn engine(&self) -> &AnchorEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    /// Start highlighting and re-apply this page's stored annotations
    ///
    /// Enabling twice is a no-op that returns an empty report.
    pub fn enable(&mut self, doc: &mut Document) -> Result<RehydrationReport> {
        if self.enabled {
            return Ok(RehydrationReport::default());
        }
        let records = self
            .store
            .load(&self.page)
            .with_context(|| format!("Failed to load annotations for {}", self.page))?;
        let report = self.engine.rehydrate(doc, &records);
        self.enabled = true;
        info!(
            "Enabled highlighting on {}: {} applied, {} failed",
            self.page,
            report.applied_count(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Stop highlighting and strip every marker from the page
    pub fn disable(&mut self, doc: &mut Document) -> usize {
        if !self.enabled {
            return 0;
        }
        self.pending = None;
        self.enabled = false;
        let removed = self.engine.teardown(doc);
        info!("Disabled highlighting on {}: {} removed", self.page, removed);
        removed
    }

    /// Capture the live selection; a new selection replaces any pending one
    pub fn on_pointer_up(&mut self, doc: &Document, selection: &Selection) -> Option<&PendingSelection> {
        if !self.enabled {
            return None;
        }
        // only the first range is anchored, so only its text is shown
        self.pending = self
            .engine
            .capture(doc, selection)
            .zip(selection.range_at(0))
            .map(|(anchor, range)| PendingSelection {
                anchor,
                text: range.text(doc).trim().to_string(),
            });
        self.pending.as_ref()
    }

    /// Drop the pending selection without highlighting it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Highlight the pending selection with `comment` and persist it
    ///
    /// A blank comment keeps the selection pending and returns `Ok(None)`.
    /// If the store rejects the record the marker is taken off again.
    pub fn confirm(&mut self, doc: &mut Document, comment: &str) -> Result<Option<AppliedHighlight>> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Ok(None);
        }
        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };

        let range = self.engine.try_resolve(doc, &pending.anchor)?;
        let highlight = self.engine.apply_highlight(doc, &range, comment)?;

        let saved = StoredAnnotation::new(&highlight.id, &self.page, comment, &pending.anchor)
            .map_err(anyhow::Error::from)
            .and_then(|record| self.store.save(&record));
        if let Err(e) = saved {
            warn!("Failed to save highlight {}: {}", highlight.id, e);
            self.engine.remove_highlight(doc, &highlight.id);
            return Err(e.context(format!("Failed to save highlight {}", highlight.id)));
        }

        debug!("Saved highlight {} on {}", highlight.id, self.page);
        Ok(Some(highlight))
    }

    /// Remove a highlight from the page and from the store
    pub fn delete(&mut self, doc: &mut Document, id: &str) -> Result<bool> {
        let removed = self.engine.remove_highlight(doc, id);
        let deleted = self.store.delete(id)?;
        Ok(removed || deleted)
    }

    /// Route one page event; disabled sessions ignore everything
    pub fn dispatch(&mut self, doc: &Document, event: PageEvent) -> Surface {
        if !self.enabled {
            return Surface::Nothing;
        }
        match event {
            PageEvent::PointerUp(selection) => match self.on_pointer_up(doc, &selection) {
                Some(pending) => Surface::CommentPrompt {
                    text: pending.text.clone(),
                },
                None => Surface::Nothing,
            },
            PageEvent::PointerOver { target, at } => match self.engine.pointer_over(doc, target, at) {
                Some(tooltip) => Surface::Tooltip(tooltip.clone()),
                None => Surface::Nothing,
            },
            PageEvent::PointerOut { target, related } => {
                let shown = self.engine.tooltip().is_some();
                self.engine.pointer_out(doc, target, related);
                if shown && self.engine.tooltip().is_none() {
                    Surface::HideTooltip
                } else {
                    Surface::Nothing
                }
            }
        }
    }
}
