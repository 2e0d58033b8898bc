//! Annotation records and their storage
//!
//! - [`StoredAnnotation`]: comment text plus the anchor's selector string
//! - [`AnnotationStore`]: persistence seam, with in-memory and JSON-file
//!   implementations

mod store;
mod types;

pub use store::{AnnotationStore, JsonFileStore, MemoryStore};
pub use types::StoredAnnotation;
