//! KNotion anchoring library
//!
//! Durable text anchors for annotated pages: a selection is captured as a
//! pair of structural paths with character offsets, stored as an opaque JSON
//! selector, and later resolved against a freshly loaded (possibly changed)
//! copy of the page and wrapped in a highlight marker.
//!
//! # Modules
//!
//! - `dom`: mutable document tree, markup parsing and ranges
//! - `path`: structural paths (`/html[1]/body[1]/p[2]`) and their resolution
//! - `anchor`: capture, resolve, highlight and re-hydrate
//! - `highlight`: marker elements and the hover tooltip
//! - `annotations`: stored records and stores
//! - `session`: the per-page controller a host wires events into

pub mod anchor;
pub mod annotations;
pub mod config;
pub mod dom;
pub mod error;
pub mod highlight;
pub mod path;
pub mod selection;
pub mod session;

pub use anchor::{AnchorEngine, AppliedHighlight, RehydrationReport, SerializedAnchor};
pub use error::{AnchorError, Result};
pub use path::StructuralPath;
pub use selection::Selection;
pub use session::AnnotationSession;
