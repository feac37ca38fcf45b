// src/services/catalog.rs

//! Catalog client contract shared by all Kramerius API versions.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{ApiVersion, ChildRef, HttpConfig, NodeDetails};
use crate::services::{KrameriusV5, KrameriusV7};
use crate::utils::http::Transport;

/// Uniform view of a remote catalog.
///
/// Implementations differ in how many requests they need: V5 embeds model and
/// label in the children listing, V7 needs one search request per child.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// API version this client speaks.
    fn version(&self) -> ApiVersion;

    /// Version string reported by the running catalog.
    async fn fetch_version(&self) -> Result<String>;

    /// Children of `pid`; empty for leaves.
    async fn fetch_children(&self, pid: &str) -> Result<Vec<ChildRef>>;

    /// Model and label of a child. `None` when the catalog has no usable
    /// label for it.
    async fn resolve_details(&self, child: &ChildRef) -> Result<Option<NodeDetails>>;

    /// HTTP requests sent so far.
    fn request_count(&self) -> usize {
        0
    }
}

/// Body of the `info` endpoint (both versions).
#[derive(Debug, Deserialize)]
pub(crate) struct InfoResponse {
    pub version: String,
}

/// Compare the catalog's reported major version with the declared one.
pub async fn check_version(api: &dyn CatalogApi) -> Result<()> {
    let reported = api.fetch_version().await?;
    let declared = api.version();
    if reported.trim().is_empty() {
        return Err(AppError::catalog("info", "no version reported"));
    }
    if reported.trim_start().starts_with(declared.major()) {
        log::info!("Catalog version {reported} matches declared version {declared}");
        Ok(())
    } else {
        Err(AppError::VersionMismatch {
            declared: declared.to_string(),
            reported,
        })
    }
}

/// Build the client for `version` and verify it against the catalog.
///
/// A version mismatch is reported here, before any traversal starts.
pub async fn connect(version: ApiVersion, api_url: &str, config: &HttpConfig) -> Result<Box<dyn CatalogApi>> {
    let transport = Transport::new(config)?;
    let api: Box<dyn CatalogApi> = match version {
        ApiVersion::V5 => Box::new(KrameriusV5::new(api_url, transport)),
        ApiVersion::V7 => Box::new(KrameriusV7::new(api_url, transport)),
    };
    check_version(api.as_ref()).await?;
    Ok(api)
}
