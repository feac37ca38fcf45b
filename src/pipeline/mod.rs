//! Pipeline entry points.
//!
//! - `run_download`: Crawl a periodical's catalog tree and persist it
//! - `run_linking`: Resolve a citation batch against a downloaded periodical

pub mod download;
pub mod link;

pub use download::{DownloadReport, download_tree, run_download};
pub use link::{link_citations, run_linking};
