// src/pipeline/download.rs

//! Catalog download pipeline.

use crate::error::{AppError, Result};
use crate::models::{Config, Periodical};
use crate::services::{CatalogApi, CrawlStats, TreeBuilder, connect};
use crate::storage::PeriodicalStorage;
use crate::tree::IntegrityWarning;
use crate::utils::get_domain;
use crate::utils::log as present;

/// What a download produced besides the tree itself.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub stats: CrawlStats,
    pub warnings: Vec<IntegrityWarning>,
}

/// Crawl `periodical` through `api` and replace its tree.
///
/// The existing tree is left untouched if the crawl fails.
pub async fn download_tree(
    api: &dyn CatalogApi,
    config: &Config,
    periodical: &mut Periodical,
) -> Result<DownloadReport> {
    let builder = TreeBuilder::new(api, &config.crawl)
        .with_keys(periodical.tree.root(), periodical.tree.separator());

    let volumes = builder.count_volumes(&periodical.uuid).await?;
    present::sub_item(&format!("{} has {volumes} volume(s)", periodical.name));

    let outcome = builder.build(&periodical.uuid).await?;
    periodical.set_tree(outcome.tree);

    Ok(DownloadReport {
        stats: outcome.stats,
        warnings: outcome.warnings,
    })
}

/// Load the periodical stored under `key`, crawl its catalog and save it back.
pub async fn run_download(
    config: &Config,
    storage: &dyn PeriodicalStorage,
    key: &str,
) -> Result<DownloadReport> {
    let mut periodical = storage
        .load_periodical(key)
        .await?
        .ok_or_else(|| AppError::config(format!("periodical file not found: {key}")))?;

    present::header(&format!("Downloading {}", periodical.name));
    present::step(1, 3, "Checking catalog version");
    present::sub_item(&format!(
        "{} (Kramerius {}) at {}",
        periodical.library,
        periodical.version,
        get_domain(&periodical.api_url).unwrap_or_else(|| periodical.api_url.clone())
    ));
    let api = connect(periodical.version, &periodical.api_url, &config.http).await?;

    present::step(2, 3, "Crawling catalog tree");
    let report = download_tree(api.as_ref(), config, &mut periodical).await?;
    for warning in &report.warnings {
        log::warn!("{warning}");
    }

    present::step(3, 3, "Saving periodical");
    storage.save_periodical(key, &periodical).await?;

    let stats = &report.stats;
    present::summary(
        &periodical.name,
        &[
            ("Nodes", stats.node_count.to_string()),
            ("Edges", stats.edge_count.to_string()),
            ("Requests", stats.request_count.to_string()),
            ("Skipped children", stats.skipped_children.to_string()),
            ("Truncated parents", stats.truncated_parents.to_string()),
            ("Warnings", report.warnings.len().to_string()),
            (
                "Duration",
                format!("{}s", (stats.end_time - stats.start_time).num_seconds()),
            ),
        ],
    );
    present::success("Download complete");

    Ok(report)
}
