//! Annotation persistence
//!
//! The engine never talks to storage; the session hands records to an
//! [`AnnotationStore`] after a highlight is applied and reads them back on
//! page load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::StoredAnnotation;

/// Persistence collaborator for annotations
pub trait AnnotationStore {
    /// Insert or replace a record by id
    fn save(&mut self, annotation: &StoredAnnotation) -> Result<()>;

    /// Records for one page, oldest first
    fn load(&self, page: &str) -> Result<Vec<StoredAnnotation>>;

    /// Delete by id; returns whether a record existed
    fn delete(&mut self, id: &str) -> Result<bool>;
}

fn sorted_for_page(records: &BTreeMap<String, StoredAnnotation>, page: &str) -> Vec<StoredAnnotation> {
    let mut out: Vec<StoredAnnotation> = records
        .values()
        .filter(|record| record.page == page)
        .cloned()
        .collect();
    out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    out
}

/// Volatile store for tests and one-shot runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, StoredAnnotation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AnnotationStore for MemoryStore {
    fn save(&mut self, annotation: &StoredAnnotation) -> Result<()> {
        self.records
            .insert(annotation.id.clone(), annotation.clone());
        Ok(())
    }

    fn load(&self, page: &str) -> Result<Vec<StoredAnnotation>> {
        Ok(sorted_for_page(&self.records, page))
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        Ok(self.records.remove(id).is_some())
    }
}

/// All records in one pretty-printed JSON array on disk
///
/// A missing file reads as an empty store. Every write rewrites the file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record regardless of page
    pub fn load_all(&self) -> Result<Vec<StoredAnnotation>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn read_map(&self) -> Result<BTreeMap<String, StoredAnnotation>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect())
    }

    fn write_map(&self, records: &BTreeMap<String, StoredAnnotation>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let records: Vec<&StoredAnnotation> = records.values().collect();
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl AnnotationStore for JsonFileStore {
    fn save(&mut self, annotation: &StoredAnnotation) -> Result<()> {
        let mut records = self.read_map()?;
        records.insert(annotation.id.clone(), annotation.clone());
        self.write_map(&records)
    }

    fn load(&self, page: &str) -> Result<Vec<StoredAnnotation>> {
        Ok(sorted_for_page(&self.read_map()?, page))
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        let mut records = self.read_map()?;
        if records.remove(id).is_none() {
            return Ok(false);
        }
        self.write_map(&records)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::SerializedAnchor;
    use crate::path::StructuralPath;
    use tempfile::TempDir;

    fn record(id: &str, page: &str) -> StoredAnnotation {
        let path: StructuralPath = "/p[1]".parse().unwrap();
        let anchor = SerializedAnchor::new(path.clone(), 0, path, 3);
        StoredAnnotation::new(id, page, "comment", &anchor).unwrap()
    }

    #[test]
    fn test_memory_store_filters_by_page() {
        let mut store = MemoryStore::new();
        store.save(&record("a", "one.html")).unwrap();
        store.save(&record("b", "two.html")).unwrap();

        let loaded = store.load("one.html").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "a");

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("annotations.json"));

        assert!(store.load("page.html").unwrap().is_empty());
    }

    #[test]
    fn test_json_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("annotations.json");

        let mut store = JsonFileStore::new(&path);
        store.save(&record("a", "page.html")).unwrap();
        store.save(&record("b", "page.html")).unwrap();
        store.delete("a").unwrap();

        let reopened = JsonFileStore::new(&path);
        let loaded = reopened.load("page.html").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
        assert_eq!(loaded[0].anchor().unwrap().end_offset, 3);
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("annotations.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load("page.html").is_err());
    }
}
