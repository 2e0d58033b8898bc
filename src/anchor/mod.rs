//! Anchor engine
//!
//! Capture a selection as a [`SerializedAnchor`], resolve it against a
//! reloaded page, and wrap the resolved range in a highlight marker.
//!
//! # Example
//!
//! ```ignore
//! let mut engine = AnchorEngine::new(MarkerConfig::default());
//! let anchor = engine.capture(&doc, &selection).unwrap();
//! let selector = anchor.to_selector()?;
//!
//! // later, on a fresh copy of the page
//! let anchor = SerializedAnchor::from_selector(&selector)?;
//! if let Some(range) = engine.resolve(&doc, &anchor) {
//!     engine.apply_highlight(&mut doc, &range, "comment")?;
//! }
//! ```

mod engine;
mod ids;
mod types;

pub use engine::{AnchorEngine, RehydrationFailure, RehydrationReport};
pub use ids::{IdError, IdGenerator, SequentialIds, UuidGenerator};
pub use types::{AppliedHighlight, SerializedAnchor};
