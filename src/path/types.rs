//! Structural path types
//!
//! A structural path addresses an element by the chain of
//! `(tag name, same-tag sibling ordinal)` steps leading to it from the
//! document root. Text form: `/html[1]/body[1]/p[2]`; the root itself is `/`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::parser::{parse_path, PathParseError};

/// A tag-qualified, sibling-indexed path from the document root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructuralPath {
    steps: Vec<PathStep>,
}

/// One step of a [`StructuralPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Element tag name (lowercase)
    pub tag: String,
    /// 1-based position among siblings with the same tag
    pub ordinal: u32,
}

impl StructuralPath {
    /// The root sentinel path (`/`)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps below the root
    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

impl PathStep {
    pub fn new(tag: impl Into<String>, ordinal: u32) -> Self {
        Self {
            tag: tag.into(),
            ordinal,
        }
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "/");
        }
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.tag, self.ordinal)
    }
}

impl FromStr for StructuralPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

// Paths travel inside stored anchors in their text form

impl Serialize for StructuralPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StructuralPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
