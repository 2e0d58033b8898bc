//! Highlight markers and their hover affordance

mod marker;
mod tooltip;

pub use marker::{create_marker, enclosing_marker, marker_id, unwrap_marker, MarkerConfig};
pub use tooltip::{PagePoint, Tooltip, TooltipSurface};
