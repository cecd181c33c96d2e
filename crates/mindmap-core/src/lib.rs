use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod validate;

pub use validate::{TreeError, validate_tree};

/// Stable string key for a semantic node. Ids are assigned by the generator
/// and never change across edits, so view state can reference nodes by id
/// across reloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Semantic classification of a node. Purely descriptive: rendering picks
/// colors and icons from it, layout ignores it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Topic,
    Detail,
    Risk,
    Action,
    Definition,
    Example,
}

/// Reference back into a source document. Opaque to the core; carried
/// through verbatim for the renderer's evidence popover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRef {
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

/// One node of the semantic tree.
///
/// `bullets`, `children` and `evidence` are modeled as explicit `Option`s so
/// that "leaf" and "has an empty children list" stay distinguishable after a
/// serialization round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticNode {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<EvidenceRef>>,
}

impl SemanticNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(id),
            label: label.into(),
            kind,
            bullets: None,
            children: None,
            evidence: None,
        }
    }

    /// Child ids in sibling order, empty for leaves.
    pub fn child_ids(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.child_ids().is_empty()
    }
}

/// The content graph: a single rooted tree stored arena-style as an id → node
/// map. Child order inside each node is the left-to-right sibling order the
/// layout engine uses.
///
/// Trees are produced by an external generator and must pass
/// [`validate_tree`] before any other component touches them; once accepted
/// the tree is treated as immutable content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticTree {
    pub root_id: NodeId,
    pub nodes: HashMap<NodeId, SemanticNode>,
}

impl SemanticTree {
    pub fn new(root: SemanticNode) -> Self {
        let root_id = root.id.clone();
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);
        Self { root_id, nodes }
    }

    pub fn get(&self, id: &NodeId) -> Option<&SemanticNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<&SemanticNode> {
        self.nodes.get(&self.root_id)
    }

    /// Node ids in lexicographic order, for deterministic iteration.
    pub fn sorted_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_serializes_lowercase() {
        let json = serde_json::to_string(&NodeKind::Definition).unwrap();
        assert_eq!(json, "\"definition\"");

        let kind: NodeKind = serde_json::from_str("\"risk\"").unwrap();
        assert_eq!(kind, NodeKind::Risk);
    }

    #[test]
    fn test_leaf_vs_empty_children_survive_round_trip() {
        let leaf = SemanticNode::new("a", "Leaf", NodeKind::Detail);
        let mut empty = SemanticNode::new("b", "Empty", NodeKind::Detail);
        empty.children = Some(vec![]);

        let leaf_json = serde_json::to_string(&leaf).unwrap();
        let empty_json = serde_json::to_string(&empty).unwrap();

        let leaf_back: SemanticNode = serde_json::from_str(&leaf_json).unwrap();
        let empty_back: SemanticNode = serde_json::from_str(&empty_json).unwrap();

        assert!(leaf_back.children.is_none());
        assert_eq!(empty_back.children, Some(vec![]));
        assert!(leaf_back.is_leaf());
        assert!(empty_back.is_leaf());
    }

    #[test]
    fn test_tree_parses_generator_output() {
        let json = r#"{
            "rootId": "node_1",
            "nodes": {
                "node_1": {
                    "id": "node_1",
                    "label": "Root",
                    "kind": "topic",
                    "bullets": ["first point"],
                    "children": ["node_2"]
                },
                "node_2": {
                    "id": "node_2",
                    "label": "Child",
                    "kind": "detail",
                    "evidence": [{"sourceId": "src_1", "quote": "quoted text", "page": 3}]
                }
            }
        }"#;

        let tree: SemanticTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.root_id, NodeId::from("node_1"));
        assert_eq!(tree.node_count(), 2);

        let child = tree.get(&NodeId::from("node_2")).unwrap();
        assert_eq!(child.kind, NodeKind::Detail);
        assert_eq!(child.evidence.as_ref().unwrap()[0].page, Some(3));
    }
}
