//! Where image records come from.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, PoisonError};

use async_trait::async_trait;
use tracing::{debug, instrument};

use sowonee_core::{Error, ImageRecord, Result};

/// Supplier of the visible record set.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch every record with `is_visible == true`.
    async fn fetch_visible(&self) -> Result<Vec<ImageRecord>>;
}

/// In-memory source, replaceable at runtime.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Arc<RwLock<Vec<ImageRecord>>>,
}

impl StaticSource {
    pub fn new(records: Vec<ImageRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Swap the backing records, e.g. after an upload.
    pub fn replace(&self, records: Vec<ImageRecord>) {
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = records;
    }
}

#[async_trait]
impl ImageSource for StaticSource {
    async fn fetch_visible(&self) -> Result<Vec<ImageRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().filter(|r| r.is_visible).cloned().collect())
    }
}

/// Reads a JSON array of records from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ImageSource for JsonFileSource {
    #[instrument(skip(self), fields(subsystem = "gallery", component = "source", path = %self.path.display()))]
    async fn fetch_visible(&self) -> Result<Vec<ImageRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Source(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let records: Vec<ImageRecord> = serde_json::from_str(&content)?;
        let total = records.len();
        let visible: Vec<ImageRecord> = records.into_iter().filter(|r| r.is_visible).collect();
        debug!(input_count = total, result_count = visible.len(), "Records loaded");
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_drops_hidden() {
        let source = StaticSource::new(vec![
            ImageRecord::new("a", "A", "2025-01-01"),
            ImageRecord::new("b", "B", "2025-01-01").hidden(),
        ]);
        let records = source.fetch_visible().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");

        source.replace(vec![]);
        assert!(source.fetch_visible().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_file_source_reads_stored_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "1", "title": "소원", "created_at": "2025-01-01T00:00:00Z", "character": "sowon"},
                {"id": "2", "title": "hidden", "created_at": "2025-01-02T00:00:00Z", "is_visible": false}
            ]"#,
        )
        .unwrap();

        let records = JsonFileSource::new(&path).fetch_visible().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].character.as_deref(), Some("sowon"));
        assert_eq!(records[0].likes, 0);
    }

    #[tokio::test]
    async fn test_json_file_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = JsonFileSource::new(dir.path().join("absent.json"));
        assert!(matches!(missing.fetch_visible().await, Err(Error::Source(_))));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            JsonFileSource::new(&path).fetch_visible().await,
            Err(Error::Serialization(_))
        ));
    }
}
