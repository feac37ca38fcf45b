// src/tree/mod.rs

//! Catalog tree: an arena of nodes keyed by path plus adjacency lists.
//!
//! Keys are built by joining the root label with the labels of all ancestors,
//! so the key of a page is e.g. `root/12/2/5`. Structural problems are kept as
//! data ([`IntegrityWarning`]) rather than errors: an over-deep or non-tree
//! structure is still usable for linking.

mod document;

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

pub use document::{NestedNode, NodeAttributes, NodeLinkDocument, NodeLinkEdge, NodeLinkNode, TreeDocument};

use crate::models::{CatalogNode, NodeModel};

/// Default sentinel key of the root node.
pub const DEFAULT_ROOT: &str = "root";

/// Default key separator.
pub const DEFAULT_SEPARATOR: &str = "/";

/// Outcome of inserting a discovered child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// Node and parent edge were added under this key
    Inserted(String),
    /// Key already taken; the existing node was kept
    Collision { key: String, kept_uuid: String },
}

/// Soft integrity problem found while building or checking a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// Nodes were found deeper than the configured bound
    DepthExceeded {
        deepest_key: String,
        depth: usize,
        max_depth: usize,
        count: usize,
    },
    /// Two siblings normalized to the same key
    KeyCollision {
        key: String,
        kept_uuid: String,
        rejected_uuid: String,
    },
    /// A children query returned as many rows as the catalog allows
    PossibleTruncation { key: String, rows: usize },
    /// The same catalog node is listed under more than one parent
    SharedNode {
        uuid: String,
        key: String,
        extra_parent: String,
    },
    /// Structure is not a strict tree
    NotATree,
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthExceeded {
                deepest_key,
                depth,
                max_depth,
                count,
            } => write!(
                f,
                "{count} node(s) deeper than {max_depth}; deepest `{deepest_key}` at depth {depth}"
            ),
            Self::KeyCollision {
                key,
                kept_uuid,
                rejected_uuid,
            } => write!(
                f,
                "key `{key}` already used by {kept_uuid}; sibling {rejected_uuid} was skipped"
            ),
            Self::PossibleTruncation { key, rows } => {
                write!(f, "children of `{key}` hit the row limit ({rows}); result may be truncated")
            }
            Self::SharedNode {
                uuid,
                key,
                extra_parent,
            } => write!(
                f,
                "{uuid} already placed at `{key}`; also listed under `{extra_parent}`"
            ),
            Self::NotATree => f.write_str("structure is not a tree"),
        }
    }
}

/// Rooted hierarchy of a digitized periodical.
#[derive(Debug, Clone)]
pub struct CatalogTree {
    root: String,
    separator: String,
    nodes: BTreeMap<String, CatalogNode>,
    children: HashMap<String, Vec<String>>,
    parents: HashMap<String, Vec<String>>,
}

impl CatalogTree {
    /// Create a tree holding only the periodical root.
    pub fn new(root: impl Into<String>, root_uuid: impl Into<String>, separator: impl Into<String>) -> Self {
        let root = root.into();
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root.clone(),
            CatalogNode::new(root.clone(), root_uuid, NodeModel::Periodical, root.clone()),
        );
        Self {
            root,
            separator: separator.into(),
            nodes,
            children: HashMap::new(),
            parents: HashMap::new(),
        }
    }

    /// An empty tree shell used while loading persisted documents.
    fn empty(root: &str, separator: &str) -> Self {
        Self {
            root: root.to_string(),
            separator: separator.to_string(),
            nodes: BTreeMap::new(),
            children: HashMap::new(),
            parents: HashMap::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn root_node(&self) -> Option<&CatalogNode> {
        self.nodes.get(&self.root)
    }

    pub fn get(&self, key: &str) -> Option<&CatalogNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }

    /// All nodes ordered by key.
    pub fn nodes(&self) -> impl Iterator<Item = &CatalogNode> {
        self.nodes.values()
    }

    /// Child keys of `key`, in discovery order.
    pub fn children(&self, key: &str) -> &[String] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parent keys of `key`; more than one means the structure is not a tree.
    pub fn parents(&self, key: &str) -> &[String] {
        self.parents.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The single child of `key`, if it has exactly one.
    pub fn only_child(&self, key: &str) -> Option<&CatalogNode> {
        match self.children(key) {
            [only] => self.nodes.get(only),
            _ => None,
        }
    }

    /// Key of a child labelled `label` under `parent`.
    pub fn child_key(&self, parent: &str, label: &str) -> String {
        format!("{parent}{}{label}", self.separator)
    }

    /// Key for a path below the root; absent components are skipped.
    pub fn path_key(&self, components: &[Option<&str>]) -> String {
        std::iter::once(self.root.as_str())
            .chain(components.iter().flatten().copied())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Insert a newly discovered child of `parent`.
    ///
    /// A key that is already present is never overwritten; the caller gets a
    /// [`Insertion::Collision`] and decides how to report it.
    pub fn insert_child(
        &mut self,
        parent: &str,
        uuid: impl Into<String>,
        model: NodeModel,
        label: impl Into<String>,
    ) -> Insertion {
        let label = label.into();
        let key = self.child_key(parent, &label);
        if let Some(existing) = self.nodes.get(&key) {
            return Insertion::Collision {
                kept_uuid: existing.uuid.clone(),
                key,
            };
        }

        self.nodes
            .insert(key.clone(), CatalogNode::new(key.clone(), uuid, model, label));
        self.link(parent, &key);
        Insertion::Inserted(key)
    }

    /// Add a node under an explicit key without any edge.
    ///
    /// Returns `false` if the key is taken.
    pub fn insert_node(&mut self, node: CatalogNode) -> bool {
        if self.nodes.contains_key(&node.key) {
            return false;
        }
        self.nodes.insert(node.key.clone(), node);
        true
    }

    /// Add an edge between two existing nodes.
    ///
    /// Returns `false` if either end is unknown. Duplicated edges are ignored.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> bool {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return false;
        }
        self.link(parent, child);
        true
    }

    fn link(&mut self, parent: &str, child: &str) {
        let siblings = self.children.entry(parent.to_string()).or_default();
        if siblings.iter().any(|s| s == child) {
            return;
        }
        siblings.push(child.to_string());
        self.parents
            .entry(child.to_string())
            .or_default()
            .push(parent.to_string());
    }

    /// Whether the structure is a strict tree rooted at the root key.
    pub fn is_tree(&self) -> bool {
        if !self.nodes.contains_key(&self.root) || !self.parents(&self.root).is_empty() {
            return false;
        }
        let single_parent = self
            .nodes
            .keys()
            .filter(|key| **key != self.root)
            .all(|key| self.parents(key).len() == 1);
        single_parent && self.reachable_from_root().len() == self.nodes.len()
    }

    fn reachable_from_root(&self) -> HashSet<&str> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([self.root.as_str()]);
        while let Some(key) = queue.pop_front() {
            if !seen.insert(key) {
                continue;
            }
            queue.extend(self.children(key).iter().map(String::as_str));
        }
        seen
    }

    /// Depth of every node reachable from the root (root = 0).
    pub fn depths(&self) -> HashMap<&str, usize> {
        let mut depths = HashMap::new();
        let mut queue = VecDeque::from([(self.root.as_str(), 0usize)]);
        while let Some((key, depth)) = queue.pop_front() {
            if depths.contains_key(key) {
                continue;
            }
            depths.insert(key, depth);
            for child in self.children(key) {
                queue.push_back((child.as_str(), depth + 1));
            }
        }
        depths
    }

    /// Check the depth bound; `None` when every node is within it.
    pub fn check_depth(&self, max_depth: usize) -> Option<IntegrityWarning> {
        let depths = self.depths();
        let too_deep: Vec<_> = depths.iter().filter(|(_, d)| **d > max_depth).collect();
        let (deepest_key, depth) = too_deep
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, d)| (k.to_string(), **d))?;
        Some(IntegrityWarning::DepthExceeded {
            deepest_key,
            depth,
            max_depth,
            count: too_deep.len(),
        })
    }

    /// Label of the last path segment of `key`, relative to `parent`.
    fn label_below(&self, parent: Option<&str>, key: &str) -> String {
        parent
            .and_then(|p| key.strip_prefix(p))
            .and_then(|rest| rest.strip_prefix(self.separator.as_str()))
            .or_else(|| key.rsplit(self.separator.as_str()).next())
            .unwrap_or(key)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CatalogTree {
        let mut tree = CatalogTree::new(DEFAULT_ROOT, "uuid:per", DEFAULT_SEPARATOR);
        tree.insert_child("root", "uuid:v12", NodeModel::Volume, "12");
        tree.insert_child("root/12", "uuid:i2", NodeModel::Issue, "2");
        tree.insert_child("root/12/2", "uuid:p5", NodeModel::Page, "5");
        tree
    }

    #[test]
    fn test_keys_follow_labels() {
        let tree = sample();
        let page = tree.get("root/12/2/5").unwrap();
        assert_eq!(page.uuid, "uuid:p5");
        assert_eq!(page.model, NodeModel::Page);
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.edge_count(), 3);
        assert!(tree.is_tree());
    }

    #[test]
    fn test_path_key_skips_absent_components() {
        let tree = sample();
        assert_eq!(tree.path_key(&[Some("12"), None, Some("5")]), "root/12/5");
        assert_eq!(tree.path_key(&[Some("12"), Some("2"), Some("5")]), "root/12/2/5");
        assert_eq!(tree.path_key(&[None, None, None]), "root");
    }

    #[test]
    fn test_collision_keeps_first_node() {
        let mut tree = sample();
        let outcome = tree.insert_child("root/12", "uuid:other", NodeModel::Issue, "2");
        assert_eq!(
            outcome,
            Insertion::Collision {
                key: "root/12/2".into(),
                kept_uuid: "uuid:i2".into()
            }
        );
        assert_eq!(tree.get("root/12/2").unwrap().uuid, "uuid:i2");
        assert_eq!(tree.children("root/12").len(), 1);
    }

    #[test]
    fn test_only_child_requires_exactly_one() {
        let mut tree = sample();
        assert_eq!(tree.only_child("root/12").unwrap().label, "2");
        tree.insert_child("root/12", "uuid:i3", NodeModel::Issue, "3");
        assert!(tree.only_child("root/12").is_none());
        assert!(tree.only_child("root/99").is_none());
    }

    #[test]
    fn test_second_parent_breaks_tree() {
        let mut tree = sample();
        tree.insert_child("root", "uuid:v13", NodeModel::Volume, "13");
        assert!(tree.add_edge("root/13", "root/12/2"));
        assert!(!tree.is_tree());
        assert_eq!(tree.parents("root/12/2").len(), 2);
    }

    #[test]
    fn test_unreachable_node_breaks_tree() {
        let mut tree = sample();
        tree.insert_node(CatalogNode::new("orphan", "uuid:x", NodeModel::Page, "1"));
        assert!(!tree.is_tree());
    }

    #[test]
    fn test_add_edge_rejects_unknown_nodes() {
        let mut tree = sample();
        assert!(!tree.add_edge("root", "root/missing"));
    }

    #[test]
    fn test_depth_within_bound_is_clean() {
        assert!(sample().check_depth(3).is_none());
    }

    #[test]
    fn test_depth_over_bound_is_reported() {
        let mut tree = sample();
        tree.insert_child("root/12/2/5", "uuid:a", NodeModel::Other("article".into()), "a");
        let warning = tree.check_depth(3).unwrap();
        assert_eq!(
            warning,
            IntegrityWarning::DepthExceeded {
                deepest_key: "root/12/2/5/a".into(),
                depth: 4,
                max_depth: 3,
                count: 1,
            }
        );
    }

    #[test]
    fn test_label_below_uses_parent_prefix() {
        let tree = sample();
        assert_eq!(tree.label_below(Some("root/12"), "root/12/5-6"), "5-6");
        assert_eq!(tree.label_below(None, "root/12/2"), "2");
    }
}
