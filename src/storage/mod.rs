//! Storage abstractions for periodicals and citation batches.
//!
//! ```text
//! {data_dir}/
//! ├── config.toml            # Configuration
//! ├── <periodical>.json      # Periodical metadata (+ tree once downloaded)
//! ├── <citations>.csv        # `id;location` input
//! └── <results>.csv          # Linking results
//! ```
//!
//! Keys are paths relative to the data directory; absolute paths are used as is.

pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CitationRecord, LinkStatus, Periodical};

// Re-export for convenience
pub use local::LocalStorage;

/// Field delimiter of citation and results files.
pub const CSV_DELIMITER: u8 = b';';

/// One row of a citation input file.
#[derive(Debug, Clone, Deserialize)]
pub struct CitationRow {
    pub id: String,
    /// One or more `;`-separated location fragments
    #[serde(default)]
    pub location: String,
}

/// One row of a results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: String,
    pub location: String,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page: Option<String>,
    pub status: LinkStatus,
    pub link: Option<String>,
}

impl From<&CitationRecord> for ResultRow {
    fn from(record: &CitationRecord) -> Self {
        Self {
            id: record.id.clone(),
            location: record.raw_location.clone(),
            volume: record.volume.clone(),
            issue: record.issue.clone(),
            page: record.page.clone(),
            status: record.status,
            link: record.resolved_link.clone(),
        }
    }
}

/// Trait for periodical and citation storage backends.
#[async_trait]
pub trait PeriodicalStorage: Send + Sync {
    /// Load a periodical; `None` if the file does not exist.
    async fn load_periodical(&self, key: &str) -> Result<Option<Periodical>>;

    /// Persist a periodical together with its tree.
    async fn save_periodical(&self, key: &str, periodical: &Periodical) -> Result<()>;

    /// Load citation records, one per location fragment.
    async fn load_citations(&self, key: &str) -> Result<Vec<CitationRecord>>;

    /// Write linking results. Returns the number of rows written.
    async fn write_results(&self, key: &str, records: &[CitationRecord]) -> Result<usize>;
}
