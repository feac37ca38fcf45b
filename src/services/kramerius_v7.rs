// src/services/kramerius_v7.rs

//! Kramerius 7 client.
//!
//! The structure endpoint lists only parent/child relations, so model and
//! label of every child cost one extra `search?q=pid:"..."` request.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{ApiVersion, ChildRef, NodeDetails, NodeModel};
use crate::services::catalog::{CatalogApi, InfoResponse};
use crate::utils::http::Transport;
use crate::utils::join_path;

const API_PREFIX: &str = "search/api/client/v7.0";

/// Fields requested from the search endpoint.
const SEARCH_FIELDS: &str = "pid,model,title.search";

/// Body of `items/{pid}/info/structure`.
#[derive(Debug, Default, Deserialize)]
pub struct StructureResponse {
    #[serde(default)]
    pub children: StructureChildren,
}

#[derive(Debug, Default, Deserialize)]
pub struct StructureChildren {
    /// Children owned by the node; foster children belong elsewhere
    #[serde(default)]
    pub own: Vec<Relation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    pub pid: String,
    #[serde(default)]
    pub relation: Option<String>,
}

/// Body of the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub response: SearchDocs,
}

#[derive(Debug, Deserialize)]
pub struct SearchDocs {
    #[serde(rename = "numFound", default)]
    pub num_found: usize,
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
pub struct SearchDoc {
    pub model: String,
    #[serde(rename = "title.search", default)]
    pub title: Option<Value>,
}

impl StructureResponse {
    pub fn into_children(self) -> Vec<ChildRef> {
        self.children
            .own
            .into_iter()
            .map(|relation| ChildRef::pid_only(relation.pid))
            .collect()
    }
}

impl SearchResponse {
    /// Model and label of the first document, if it has a usable title.
    pub fn into_details(self) -> Option<NodeDetails> {
        let doc = self.response.docs.into_iter().next()?;
        let label = match doc.title? {
            Value::String(s) => s,
            Value::Array(values) => values.into_iter().find_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })?,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let label = label.trim();
        (!label.is_empty()).then(|| NodeDetails {
            model: NodeModel::from(doc.model.as_str()),
            label: label.to_string(),
        })
    }
}

/// Client for the Kramerius 7 API.
#[derive(Debug)]
pub struct KrameriusV7 {
    base: String,
    transport: Transport,
}

impl KrameriusV7 {
    pub fn new(api_url: &str, transport: Transport) -> Self {
        Self {
            base: join_path(api_url, API_PREFIX),
            transport,
        }
    }
}

#[async_trait]
impl CatalogApi for KrameriusV7 {
    fn version(&self) -> ApiVersion {
        ApiVersion::V7
    }

    async fn fetch_version(&self) -> Result<String> {
        let info: InfoResponse = self
            .transport
            .get_json(&join_path(&self.base, "info"), &[])
            .await?;
        Ok(info.version)
    }

    async fn fetch_children(&self, pid: &str) -> Result<Vec<ChildRef>> {
        let url = join_path(&self.base, &format!("items/{pid}/info/structure"));
        let structure: StructureResponse = self.transport.get_json(&url, &[]).await?;
        Ok(structure.into_children())
    }

    async fn resolve_details(&self, child: &ChildRef) -> Result<Option<NodeDetails>> {
        let url = join_path(&self.base, "search");
        let query = format!("pid:\"{}\"", child.pid);
        let found: SearchResponse = self
            .transport
            .get_json(&url, &[("q", query.as_str()), ("fl", SEARCH_FIELDS), ("rows", "1")])
            .await?;
        if found.response.num_found > 1 {
            log::warn!("Search for {} matched {} documents", child.pid, found.response.num_found);
        }
        Ok(found.into_details())
    }

    fn request_count(&self) -> usize {
        self.transport.request_count()
    }
}
