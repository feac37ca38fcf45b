// src/services/tree_builder.rs

//! Depth-first catalog crawl.
//!
//! Starting at the periodical, every non-terminal node has its children
//! listed and resolved; each child is inserted under its parent before any of
//! its own children are fetched. Any catalog error aborts the whole build.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CrawlConfig, NodeModel};
use crate::services::CatalogApi;
use crate::tree::{CatalogTree, DEFAULT_ROOT, DEFAULT_SEPARATOR, Insertion, IntegrityWarning};
use crate::utils::log as present;

/// Statistics of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
    pub request_count: usize,
    /// Children dropped because the catalog gave no usable label
    pub skipped_children: usize,
    /// Parents whose children listing hit the row limit
    pub truncated_parents: usize,
}

/// Result of a successful crawl.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub tree: CatalogTree,
    pub warnings: Vec<IntegrityWarning>,
    pub stats: CrawlStats,
}

/// A node waiting to be expanded.
struct Pending {
    key: String,
    pid: String,
    model: NodeModel,
    depth: usize,
}

/// Builds a [`CatalogTree`] from a catalog.
pub struct TreeBuilder<'a> {
    api: &'a dyn CatalogApi,
    config: &'a CrawlConfig,
    root: String,
    separator: String,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(api: &'a dyn CatalogApi, config: &'a CrawlConfig) -> Self {
        Self {
            api,
            config,
            root: DEFAULT_ROOT.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Use a custom root key and separator.
    pub fn with_keys(mut self, root: impl Into<String>, separator: impl Into<String>) -> Self {
        self.root = root.into();
        self.separator = separator.into();
        self
    }

    fn is_terminal(&self, model: &NodeModel) -> bool {
        self.config
            .terminal_models
            .iter()
            .any(|terminal| NodeModel::from(terminal.as_str()) == *model)
    }

    /// Number of top-level children (volumes) of the periodical.
    pub async fn count_volumes(&self, periodical_uuid: &str) -> Result<usize> {
        Ok(self.api.fetch_children(periodical_uuid).await?.len())
    }

    /// Crawl the catalog below `periodical_uuid`.
    pub async fn build(&self, periodical_uuid: &str) -> Result<CrawlOutcome> {
        let start_time = Utc::now();
        let mut tree = CatalogTree::new(self.root.clone(), periodical_uuid, self.separator.clone());
        let mut warnings = Vec::new();
        let mut placed = HashMap::from([(periodical_uuid.to_string(), self.root.clone())]);
        let mut skipped_children = 0;
        let mut truncated_parents = 0;
        let mut volumes = (0usize, 0usize);

        let mut stack = vec![Pending {
            key: self.root.clone(),
            pid: periodical_uuid.to_string(),
            model: NodeModel::Periodical,
            depth: 0,
        }];

        while let Some(node) = stack.pop() {
            if self.is_terminal(&node.model) {
                continue;
            }
            if node.depth == 1 {
                volumes.0 += 1;
                present::sub_item(&format!("{} `{}` ({}/{})", node.model, node.key, volumes.0, volumes.1));
            }

            let children = self.api.fetch_children(&node.pid).await?;
            log::debug!(
                "Found {} children of {} `{}`",
                children.len(),
                node.model,
                node.key
            );
            if node.depth == 0 {
                volumes.1 = children.len();
            }
            if children.len() >= self.config.row_limit {
                log::warn!(
                    "Children of `{}` hit the row limit of {}; the listing may be truncated",
                    node.key,
                    self.config.row_limit
                );
                truncated_parents += 1;
                warnings.push(IntegrityWarning::PossibleTruncation {
                    key: node.key.clone(),
                    rows: children.len(),
                });
            }

            let mut descend = Vec::new();
            for child in children {
                if let Some(existing) = placed.get(&child.pid) {
                    // Extra parent edge; the node and its subtree exist once.
                    tree.add_edge(&node.key, existing);
                    let warning = IntegrityWarning::SharedNode {
                        uuid: child.pid,
                        key: existing.clone(),
                        extra_parent: node.key.clone(),
                    };
                    log::warn!("Shared node: {warning}");
                    warnings.push(warning);
                    continue;
                }

                let Some(details) = self.api.resolve_details(&child).await? else {
                    log::warn!("No model/label for {} under `{}`; skipped", child.pid, node.key);
                    skipped_children += 1;
                    continue;
                };

                match tree.insert_child(&node.key, child.pid.clone(), details.model.clone(), details.label) {
                    Insertion::Inserted(key) => {
                        log::debug!("Adding edge `{}` -> `{key}` ({})", node.key, details.model);
                        placed.insert(child.pid.clone(), key.clone());
                        descend.push(Pending {
                            key,
                            pid: child.pid,
                            model: details.model,
                            depth: node.depth + 1,
                        });
                    }
                    Insertion::Collision { key, kept_uuid } => {
                        let warning = IntegrityWarning::KeyCollision {
                            key,
                            kept_uuid,
                            rejected_uuid: child.pid,
                        };
                        log::warn!("Sibling collision: {warning}");
                        warnings.push(warning);
                    }
                }
            }
            stack.extend(descend.into_iter().rev());
        }

        if let Some(warning) = tree.check_depth(self.config.max_depth) {
            log::warn!("Depth check: {warning}");
            warnings.push(warning);
        }
        if !tree.is_tree() {
            log::warn!("Crawled structure is not a tree");
            warnings.push(IntegrityWarning::NotATree);
        }

        let stats = CrawlStats {
            start_time,
            end_time: Utc::now(),
            node_count: tree.node_count(),
            edge_count: tree.edge_count(),
            request_count: self.api.request_count(),
            skipped_children,
            truncated_parents,
        };
        log::info!(
            "Crawl finished: {} nodes, {} edges, {} requests, {} warning(s)",
            stats.node_count,
            stats.edge_count,
            stats.request_count,
            warnings.len()
        );

        Ok(CrawlOutcome {
            tree,
            warnings,
            stats,
        })
    }
}
