//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CitationRecord, Periodical, PeriodicalFile};
use crate::storage::{CSV_DELIMITER, CitationRow, PeriodicalStorage, ResultRow};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// Parse a `;`-delimited citation file.
pub fn parse_citations(bytes: &[u8]) -> Result<Vec<CitationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let mut records = Vec::new();
    for row in reader.deserialize::<CitationRow>() {
        let row = row?;
        let expanded = CitationRecord::expand(row.id.trim(), &row.location);
        if expanded.is_empty() {
            log::debug!("Record {} has no location", row.id);
        }
        records.extend(expanded);
    }
    Ok(records)
}

/// Render records as a `;`-delimited results file.
pub fn render_results(records: &[CitationRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(ResultRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

#[async_trait]
impl PeriodicalStorage for LocalStorage {
    async fn load_periodical(&self, key: &str) -> Result<Option<Periodical>> {
        let Some(bytes) = self.read_bytes(key).await? else {
            return Ok(None);
        };
        let file: PeriodicalFile = serde_json::from_slice(&bytes)?;
        Periodical::from_file(file).map(Some)
    }

    async fn save_periodical(&self, key: &str, periodical: &Periodical) -> Result<()> {
        self.write_json(key, &periodical.to_file()).await?;
        log::info!(
            "Saved {} ({} nodes) to {}",
            periodical.name,
            periodical.tree.node_count(),
            self.path(key).display()
        );
        Ok(())
    }

    async fn load_citations(&self, key: &str) -> Result<Vec<CitationRecord>> {
        let bytes = self.read_bytes(key).await?.ok_or_else(|| {
            AppError::config(format!("citation file not found: {}", self.path(key).display()))
        })?;
        let records = parse_citations(&bytes)?;
        log::info!("Loaded {} citation(s) from {}", records.len(), self.path(key).display());
        Ok(records)
    }

    async fn write_results(&self, key: &str, records: &[CitationRecord]) -> Result<usize> {
        let bytes = render_results(records)?;
        self.write_bytes(key, &bytes).await?;
        log::info!("Results written to {}", self.path(key).display());
        Ok(records.len())
    }
}
