//! Hover tooltip state
//!
//! The tooltip is transient UI state next to the pointer. It never becomes
//! part of the document, so it cannot disturb structural paths.

use serde::Serialize;

/// Pointer position in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

impl PagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The annotation text shown for a hovered highlight
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub highlight_id: String,
    pub text: String,
    pub position: PagePoint,
}

/// Holds at most one visible tooltip
#[derive(Debug, Clone, Default)]
pub struct TooltipSurface {
    offset_y: f64,
    current: Option<Tooltip>,
}

impl TooltipSurface {
    pub fn new(offset_y: f64) -> Self {
        Self {
            offset_y,
            current: None,
        }
    }

    /// Show `text` just above `at`, replacing any visible tooltip
    pub fn show(&mut self, highlight_id: &str, text: &str, at: PagePoint) -> &Tooltip {
        self.current.insert(Tooltip {
            highlight_id: highlight_id.to_string(),
            text: text.to_string(),
            position: PagePoint::new(at.x, at.y - self.offset_y),
        })
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    /// Hide the tooltip if it belongs to `highlight_id`
    pub fn hide_for(&mut self, highlight_id: &str) {
        if self
            .current
            .as_ref()
            .is_some_and(|tooltip| tooltip.highlight_id == highlight_id)
        {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }
}
