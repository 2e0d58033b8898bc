//! Structural paths
//!
//! Bidirectional mapping between a node and a tag-qualified,
//! sibling-indexed path from the document root.
//!
//! ```text
//! /html[1]/body[1]/div[2]/p[3]
//!  │       │       │      └── third <p> among its parent's children
//!  │       │       └───────── second <div>
//!  │       └───────────────── first <body>
//!  └───────────────────────── first <html> under the document
//! ```
//!
//! Paths are a structural fingerprint, not a stable identity: resolving after
//! the page changed may fail (`NotFound`) or land on a different element.

mod parser;
mod resolver;
mod types;

pub use parser::{parse_path, PathParseError};
pub use resolver::{compute_path, resolve_path, PathError, PathResolver};
pub use types::{PathStep, StructuralPath};
