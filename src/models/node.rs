// src/models/node.rs

//! Catalog node types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog classification of a hierarchy unit.
///
/// Serialized with the catalog's own model names so persisted trees stay
/// readable next to raw API responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeModel {
    Periodical,
    Volume,
    Issue,
    Page,
    /// Any other catalog model (supplement, article, ...), kept verbatim
    Other(String),
}

impl NodeModel {
    /// Catalog name of the model.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Periodical => "periodical",
            Self::Volume => "periodicalvolume",
            Self::Issue => "periodicalitem",
            Self::Page => "page",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for NodeModel {
    fn from(raw: &str) -> Self {
        match raw {
            "periodical" => Self::Periodical,
            "periodicalvolume" | "volume" => Self::Volume,
            "periodicalitem" | "issue" => Self::Issue,
            "page" => Self::Page,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeModel {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<NodeModel> for String {
    fn from(model: NodeModel) -> Self {
        model.as_str().to_string()
    }
}

impl fmt::Display for NodeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of the periodical hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogNode {
    /// Path key: root label and ancestor labels joined by the separator
    pub key: String,
    /// Remote identifier used for deep links
    pub uuid: String,
    pub model: NodeModel,
    /// Volume/issue/page number as reported by the catalog
    pub label: String,
}

impl CatalogNode {
    pub fn new(
        key: impl Into<String>,
        uuid: impl Into<String>,
        model: NodeModel,
        label: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            uuid: uuid.into(),
            model,
            label: label.into(),
        }
    }
}

/// Model and label of a child, as resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    pub model: NodeModel,
    pub label: String,
}

/// A child reference returned by a children query.
///
/// Depending on the protocol, model and label may already be known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChildRef {
    pub pid: String,
    pub model: Option<String>,
    pub label: Option<String>,
}

impl ChildRef {
    pub fn pid_only(pid: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            ..Self::default()
        }
    }
}
