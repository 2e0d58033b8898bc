//! Document model
//!
//! A small mutable tree standing in for the live page DOM: enough structure
//! for anchoring (elements, text, comments), live-range boundary points, and
//! the two mutations highlighting needs (`surroundContents` and unwrap +
//! normalize).
//!
//! # Usage
//!
//! ```ignore
//! use knotion_anchor::dom::{parse, Range};
//!
//! let mut doc = parse("<p>Hello world</p>")?;
//! let p = doc.document_element().unwrap();
//! let text = doc.children(p)[0];
//! let range = Range::within(&doc, text, 6, 11)?;
//! assert_eq!(range.text(&doc), "world");
//! ```

mod error;
mod parser;
mod range;
mod serializer;
mod tree;

pub use error::DomError;
pub use parser::parse;
pub use range::{compare_points, find_text, BoundaryPoint, Range, TextSegment};
pub use serializer::{inner_markup, outer_markup, to_markup};
pub use tree::{Ancestors, Descendants, Document, ElementData, NodeId, NodeKind};
