//! Service layer for the crawler and linker.
//!
//! This module contains the business logic for:
//! - Catalog access (`CatalogApi`, `KrameriusV5`, `KrameriusV7`)
//! - Tree crawling (`TreeBuilder`)
//! - Citation linking (`Linker`)

mod catalog;
mod kramerius_v5;
mod kramerius_v7;
mod linker;
mod tree_builder;

pub use catalog::{CatalogApi, check_version, connect};
pub use kramerius_v5::KrameriusV5;
pub use kramerius_v7::KrameriusV7;
pub use linker::{LinkReport, Linker};
pub use tree_builder::{CrawlOutcome, CrawlStats, TreeBuilder};
