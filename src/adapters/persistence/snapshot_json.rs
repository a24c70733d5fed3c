//! Implements SnapshotPort using JSON files.
//!
//! Layout under the root directory:
//! - `integrations.json` — listing page data
//! - `integration/<stem>.json` — one file per detail page

use crate::domain::{DomainError, IntegrationDetail, IntegrationEntry};
use crate::ports::SnapshotPort;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub const LISTING_FILE: &str = "integrations.json";
pub const DETAIL_DIR: &str = "integration";

/// Listing file body.
#[derive(Debug, Serialize)]
struct Listing<'a> {
    generated_at: DateTime<Utc>,
    count: usize,
    records: &'a [IntegrationEntry],
}

/// JSON file-based snapshot writer.
pub struct SnapshotJson {
    root: PathBuf,
}

impl SnapshotJson {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path of the detail file named `stem`. Stems that could leave the
    /// detail directory (empty, separators, dots) are rejected.
    pub fn detail_path(&self, stem: &str) -> Result<PathBuf, DomainError> {
        let valid = !stem.is_empty()
            && stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DomainError::Export(format!(
                "invalid detail file stem {:?}",
                stem
            )));
        }
        Ok(self.root.join(DETAIL_DIR).join(format!("{}.json", stem)))
    }

    /// Atomic save using write-replace pattern.
    /// 1. Write to temp file
    /// 2. sync_all() to ensure flush to disk
    /// 3. Rename to target path
    async fn write_atomic(path: &Path, json: &str) -> Result<(), DomainError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::Export(format!("create dir {}: {}", parent.display(), e))
            })?;
        }

        let temp_path = path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Export(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Export(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Export(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| DomainError::Export(format!("rename failed: {}", e)))?;

        debug!(path = %path.display(), bytes = json.len(), "snapshot file written");
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotPort for SnapshotJson {
    async fn write_listing(&self, entries: &[IntegrationEntry]) -> Result<PathBuf, DomainError> {
        let listing = Listing {
            generated_at: Utc::now(),
            count: entries.len(),
            records: entries,
        };
        let json = serde_json::to_string_pretty(&listing)
            .map_err(|e| DomainError::Export(e.to_string()))?;
        let path = self.root.join(LISTING_FILE);
        Self::write_atomic(&path, &json).await?;
        Ok(path)
    }

    async fn write_detail(
        &self,
        stem: &str,
        detail: &IntegrationDetail,
    ) -> Result<PathBuf, DomainError> {
        let path = self.detail_path(stem)?;
        let json = serde_json::to_string_pretty(detail)
            .map_err(|e| DomainError::Export(e.to_string()))?;
        Self::write_atomic(&path, &json).await?;
        Ok(path)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
