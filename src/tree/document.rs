// src/tree/document.rs

//! Persisted tree shapes.
//!
//! A strict tree is written as one nested document rooted at the root key.
//! Anything else falls back to a node-link document listing nodes and edges
//! so that no parent is silently dropped.

use serde::{Deserialize, Serialize};

use super::CatalogTree;
use crate::error::{AppError, Result};
use crate::models::{CatalogNode, NodeModel};

/// Attributes stored for every node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub model: NodeModel,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Nested tree document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedNode {
    pub id: String,
    pub attributes: NodeAttributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NestedNode>,
}

/// Node entry of a node-link document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub id: String,
    #[serde(flatten)]
    pub attributes: NodeAttributes,
}

/// Edge entry of a node-link document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    pub source: String,
    pub target: String,
}

/// Generic graph document used when the structure is not a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    pub nodes: Vec<NodeLinkNode>,
    pub edges: Vec<NodeLinkEdge>,
}

/// Either persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeDocument {
    Nested(NestedNode),
    NodeLink(NodeLinkDocument),
}

impl TreeDocument {
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }
}

fn attributes(node: &CatalogNode) -> NodeAttributes {
    NodeAttributes {
        model: node.model.clone(),
        uuid: node.uuid.clone(),
        label: Some(node.label.clone()),
    }
}

impl CatalogTree {
    /// Build the persisted document, choosing the shape by structure.
    pub fn to_document(&self) -> TreeDocument {
        match self.root_node() {
            Some(root) if self.is_tree() => TreeDocument::Nested(self.nest(root)),
            _ => {
                log::warn!(
                    "Not a tree ({} nodes, {} edges); saving as node-link document",
                    self.node_count(),
                    self.edge_count()
                );
                TreeDocument::NodeLink(self.node_link())
            }
        }
    }

    fn nest(&self, node: &CatalogNode) -> NestedNode {
        NestedNode {
            id: node.key.clone(),
            attributes: attributes(node),
            children: self
                .children(&node.key)
                .iter()
                .filter_map(|key| self.get(key))
                .map(|child| self.nest(child))
                .collect(),
        }
    }

    fn node_link(&self) -> NodeLinkDocument {
        let nodes = self
            .nodes()
            .map(|node| NodeLinkNode {
                id: node.key.clone(),
                attributes: attributes(node),
            })
            .collect();
        let edges = self
            .nodes()
            .flat_map(|node| {
                self.children(&node.key).iter().map(|child| NodeLinkEdge {
                    source: node.key.clone(),
                    target: child.clone(),
                })
            })
            .collect();
        NodeLinkDocument {
            directed: true,
            multigraph: false,
            nodes,
            edges,
        }
    }

    /// Rebuild a tree from either persisted shape.
    pub fn from_document(document: &TreeDocument, root: &str, separator: &str) -> Result<Self> {
        let mut tree = Self::empty(root, separator);
        match document {
            TreeDocument::Nested(top) => {
                if top.id != root {
                    return Err(AppError::validation(format!(
                        "tree document is rooted at `{}`, expected `{root}`",
                        top.id
                    )));
                }
                let mut stack = vec![(None::<String>, top)];
                while let Some((parent, doc)) = stack.pop() {
                    tree.insert_document_node(parent.as_deref(), &doc.id, &doc.attributes)?;
                    if let Some(parent) = parent.as_deref() {
                        tree.add_edge(parent, &doc.id);
                    }
                    stack.extend(doc.children.iter().rev().map(|c| (Some(doc.id.clone()), c)));
                }
            }
            TreeDocument::NodeLink(graph) => {
                for node in &graph.nodes {
                    tree.insert_document_node(None, &node.id, &node.attributes)?;
                }
                for edge in &graph.edges {
                    if !tree.add_edge(&edge.source, &edge.target) {
                        return Err(AppError::validation(format!(
                            "edge `{}` -> `{}` references an unknown node",
                            edge.source, edge.target
                        )));
                    }
                }
                if !tree.contains(root) {
                    return Err(AppError::validation(format!(
                        "node-link document has no root node `{root}`"
                    )));
                }
                if !tree.is_tree() {
                    log::warn!("Loaded structure rooted at `{root}` is not a tree");
                }
            }
        }
        Ok(tree)
    }

    fn insert_document_node(
        &mut self,
        parent: Option<&str>,
        key: &str,
        attrs: &NodeAttributes,
    ) -> Result<()> {
        let label = attrs
            .label
            .clone()
            .unwrap_or_else(|| self.label_below(parent, key));
        let node = CatalogNode::new(key, attrs.uuid.clone(), attrs.model.clone(), label);
        if self.insert_node(node) {
            Ok(())
        } else {
            Err(AppError::validation(format!("duplicate node `{key}` in tree document")))
        }
    }
}
