// src/models/mod.rs

//! Domain models for the crawler and linker.

mod citation;
mod config;
mod node;
mod periodical;

// Re-export all public types
pub use citation::{CitationRecord, LinkStatus};
pub use config::{Config, CrawlConfig, HttpConfig, StorageConfig};
pub use node::{CatalogNode, ChildRef, NodeDetails, NodeModel};
pub use periodical::{ApiVersion, Periodical, PeriodicalFile};
