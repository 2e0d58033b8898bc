//! Highlight identifier sources

use thiserror::Error;
use uuid::Uuid;

/// Identifier minting failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("Identifier source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies collision-resistant identifiers for new highlights
pub trait IdGenerator {
    fn next_id(&mut self) -> Result<String, IdError>;
}

/// Random v4 UUIDs; safe across reloads and tabs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> Result<String, IdError> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids for tests and fixtures
///
/// Counters collide across page loads; never use this for real highlights.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Result<String, IdError> {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        Ok(id)
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> Result<String, IdError>,
{
    fn next_id(&mut self) -> Result<String, IdError> {
        self()
    }
}
