// src/services/kramerius_v5.rs

//! Kramerius 5 client.
//!
//! `item/{pid}/children` already carries model and a `details` map, so no
//! follow-up request is needed. Only volumes, issues and pages are kept.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{ApiVersion, ChildRef, NodeDetails, NodeModel};
use crate::services::catalog::{CatalogApi, InfoResponse};
use crate::utils::http::Transport;
use crate::utils::join_path;

const API_PREFIX: &str = "search/api/v5.0";

/// One entry of the children listing.
#[derive(Debug, Clone, Deserialize)]
pub struct V5Child {
    pub pid: String,
    pub model: String,
    #[serde(default)]
    pub details: HashMap<String, Value>,
    #[serde(default)]
    pub title: Option<String>,
}

/// `details` key holding the label for a model, for the models we keep.
fn label_key(model: &str) -> Option<&'static str> {
    match model {
        "periodicalvolume" => Some("volumeNumber"),
        "periodicalitem" => Some("partNumber"),
        "page" => Some("pagenumber"),
        _ => None,
    }
}

/// Convert the raw listing, dropping models outside the known set.
pub fn children_from(listing: Vec<V5Child>) -> Vec<ChildRef> {
    listing
        .into_iter()
        .filter_map(|child| {
            let Some(key) = label_key(&child.model) else {
                log::debug!("Skipping {} ({})", child.pid, child.model);
                return None;
            };
            let label = child
                .details
                .get(key)
                .and_then(value_label)
                .or_else(|| child.title.as_deref().map(str::trim).map(str::to_string))
                .filter(|label| !label.is_empty());
            Some(ChildRef {
                pid: child.pid,
                model: Some(child.model),
                label,
            })
        })
        .collect()
}

/// Page numbers come with stray whitespace (including NBSP); numbers may be
/// sent as JSON numbers.
fn value_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Client for the Kramerius 5 API.
#[derive(Debug)]
pub struct KrameriusV5 {
    base: String,
    transport: Transport,
}

impl KrameriusV5 {
    pub fn new(api_url: &str, transport: Transport) -> Self {
        Self {
            base: join_path(api_url, API_PREFIX),
            transport,
        }
    }
}

#[async_trait]
impl CatalogApi for KrameriusV5 {
    fn version(&self) -> ApiVersion {
        ApiVersion::V5
    }

    async fn fetch_version(&self) -> Result<String> {
        let info: InfoResponse = self
            .transport
            .get_json(&join_path(&self.base, "info"), &[])
            .await?;
        Ok(info.version)
    }

    async fn fetch_children(&self, pid: &str) -> Result<Vec<ChildRef>> {
        let url = join_path(&self.base, &format!("item/{pid}/children"));
        let listing: Vec<V5Child> = self.transport.get_json(&url, &[]).await?;
        Ok(children_from(listing))
    }

    async fn resolve_details(&self, child: &ChildRef) -> Result<Option<NodeDetails>> {
        Ok(child
            .model
            .as_deref()
            .zip(child.label.as_deref())
            .map(|(model, label)| NodeDetails {
                model: NodeModel::from(model),
                label: label.to_string(),
            }))
    }

    fn request_count(&self) -> usize {
        self.transport.request_count()
    }
}
