use mindmap_core::{NodeId, SemanticTree};
use mindmap_layout::{LayoutConfig, Vec2, layout};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// State-consistency failure: a mutation named a node the current tree does
/// not have. Stale clicks after a tree swap are expected, so callers treat
/// this as a reported no-op rather than a fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("node `{0}` is not part of the current view state")]
    UnknownNode(NodeId),
}

/// Pan offset and zoom factor of the canvas. The zoom range is an invariant
/// of the type, not just of `set_viewport`: persisted documents with an
/// out-of-range zoom are clamped back into range while deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ViewportWire")]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Viewport {
    pub const ZOOM_MIN: f64 = 0.1;
    pub const ZOOM_MAX: f64 = 2.0;

    /// Clamps into the supported range; a non-finite zoom falls back to 1.
    pub fn clamp_zoom(zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(Self::ZOOM_MIN, Self::ZOOM_MAX)
        } else {
            1.0
        }
    }
}

#[derive(Deserialize)]
struct ViewportWire {
    x: f64,
    y: f64,
    zoom: f64,
}

impl From<ViewportWire> for Viewport {
    fn from(wire: ViewportWire) -> Self {
        let zoom = Viewport::clamp_zoom(wire.zoom);
        if zoom != wire.zoom {
            tracing::warn!(
                stored = wire.zoom,
                clamped = zoom,
                "persisted viewport zoom was out of range"
            );
        }
        Self {
            x: wire.x,
            y: wire.y,
            zoom,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Per-node visual overlay. `locked` flips to true the moment the user drags
/// a node and from then on shields its position from auto-layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeViewStateWire")]
pub struct NodeViewState {
    pub pos: Vec2,
    pub collapsed: bool,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NodeViewState {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            collapsed: false,
            locked: false,
            color: None,
            icon: None,
        }
    }
}

impl Default for NodeViewState {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

/// Accepts both the current schema and the legacy one, which stored the
/// position under `position` instead of `pos` and omitted `locked`. An entry
/// with no position at all falls back to the origin instead of failing the
/// whole load.
#[derive(Deserialize)]
struct NodeViewStateWire {
    #[serde(default)]
    pos: Option<Vec2>,
    #[serde(default)]
    position: Option<Vec2>,
    #[serde(default)]
    collapsed: bool,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

impl From<NodeViewStateWire> for NodeViewState {
    fn from(wire: NodeViewStateWire) -> Self {
        if wire.pos.is_none() && wire.position.is_some() {
            tracing::debug!("normalized legacy `position` field on node view entry");
        }
        Self {
            pos: wire.pos.or(wire.position).unwrap_or_default(),
            collapsed: wire.collapsed,
            locked: wire.locked,
            color: wire.color,
            icon: wire.icon,
        }
    }
}

/// The mutable visual overlay for one document: viewport plus one
/// [`NodeViewState`] per tree node.
///
/// Every mutation takes `&mut self` and either applies completely or, when
/// the target node is unknown, changes nothing, so a renderer holding a
/// shared reference can never observe a half-applied transition (a moved
/// node whose `locked` flag has not been set yet, for instance). Mutations
/// never reach into the semantic tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub viewport: Viewport,
    #[serde(rename = "nodeState")]
    pub node_state: HashMap<NodeId, NodeViewState>,
}

impl ViewState {
    /// Builds the initial view for a freshly accepted tree: every node at
    /// its auto-layout position, unlocked and expanded, viewport at the
    /// origin with zoom 1.
    pub fn initialize(tree: &SemanticTree, config: &LayoutConfig) -> Self {
        let result = layout(tree, config);

        let node_state = tree
            .nodes
            .keys()
            .map(|id| {
                let pos = result.positions.get(id).copied().unwrap_or(Vec2::ZERO);
                (id.clone(), NodeViewState::at(pos))
            })
            .collect();

        Self {
            viewport: Viewport::default(),
            node_state,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeViewState> {
        self.node_state.get(id)
    }

    /// Moves a node to a user-chosen position. Manual placement is sticky:
    /// the entry is marked locked in the same transition, so a relayout can
    /// never move it back.
    pub fn set_position(&mut self, id: &NodeId, x: f64, y: f64) -> Result<(), ViewError> {
        let Some(entry) = self.node_state.get_mut(id) else {
            tracing::warn!("ignoring position update for unknown node {id}");
            return Err(ViewError::UnknownNode(id.clone()));
        };
        entry.pos = Vec2::new(x, y);
        entry.locked = true;
        Ok(())
    }

    /// Flips one node's collapsed flag and touches nothing else. Returns the
    /// new value.
    pub fn toggle_collapsed(&mut self, id: &NodeId) -> Result<bool, ViewError> {
        let Some(entry) = self.node_state.get_mut(id) else {
            tracing::warn!("ignoring collapse toggle for unknown node {id}");
            return Err(ViewError::UnknownNode(id.clone()));
        };
        entry.collapsed = !entry.collapsed;
        Ok(entry.collapsed)
    }

    /// Replaces the viewport, clamping zoom into the supported range. A
    /// non-finite zoom keeps the previous value.
    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) {
        let zoom = if zoom.is_finite() {
            zoom.clamp(Viewport::ZOOM_MIN, Viewport::ZOOM_MAX)
        } else {
            self.viewport.zoom
        };
        self.viewport = Viewport { x, y, zoom };
    }

    /// Aligns the overlay with a (re)loaded tree: entries for nodes that no
    /// longer exist are dropped, nodes without an entry get a default one at
    /// the origin. Returns the number of stale entries pruned.
    pub fn reconcile(&mut self, tree: &SemanticTree) -> usize {
        let before = self.node_state.len();
        self.node_state.retain(|id, _| {
            let keep = tree.contains(id);
            if !keep {
                tracing::debug!("pruning stale view entry for node {id}");
            }
            keep
        });
        let pruned = before - self.node_state.len();

        for id in tree.nodes.keys() {
            self.node_state
                .entry(id.clone())
                .or_insert_with(NodeViewState::default);
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_core::{NodeKind, SemanticNode};

    fn small_tree() -> SemanticTree {
        let mut root = SemanticNode::new("r", "Root", NodeKind::Topic);
        root.children = Some(vec![NodeId::from("a"), NodeId::from("b")]);
        let mut tree = SemanticTree::new(root);
        tree.nodes.insert(
            NodeId::from("a"),
            SemanticNode::new("a", "Left", NodeKind::Detail),
        );
        tree.nodes.insert(
            NodeId::from("b"),
            SemanticNode::new("b", "Right", NodeKind::Detail),
        );
        tree
    }

    #[test]
    fn test_initialize_seeds_unlocked_expanded() {
        let tree = small_tree();
        let view = ViewState::initialize(&tree, &LayoutConfig::default());

        assert_eq!(view.node_state.len(), 3);
        for entry in view.node_state.values() {
            assert!(!entry.locked);
            assert!(!entry.collapsed);
        }
        assert_eq!(view.viewport, Viewport::default());
    }

    #[test]
    fn test_set_position_locks_the_node() {
        let tree = small_tree();
        let mut view = ViewState::initialize(&tree, &LayoutConfig::default());
        let id = NodeId::from("a");

        view.set_position(&id, 42.0, -7.0).unwrap();

        let entry = view.node(&id).unwrap();
        assert_eq!(entry.pos, Vec2::new(42.0, -7.0));
        assert!(entry.locked);
    }

    #[test]
    fn test_mutations_on_unknown_node_are_reported_noops() {
        let tree = small_tree();
        let mut view = ViewState::initialize(&tree, &LayoutConfig::default());
        let before = view.clone();
        let ghost = NodeId::from("ghost");

        assert_eq!(
            view.set_position(&ghost, 1.0, 1.0),
            Err(ViewError::UnknownNode(ghost.clone()))
        );
        assert_eq!(
            view.toggle_collapsed(&ghost),
            Err(ViewError::UnknownNode(ghost))
        );
        assert_eq!(view, before);
    }

    #[test]
    fn test_toggle_collapsed_only_flips_the_flag() {
        let tree = small_tree();
        let mut view = ViewState::initialize(&tree, &LayoutConfig::default());
        let id = NodeId::from("a");
        let pos_before = view.node(&id).unwrap().pos;

        assert_eq!(view.toggle_collapsed(&id), Ok(true));
        assert_eq!(view.toggle_collapsed(&id), Ok(false));

        let entry = view.node(&id).unwrap();
        assert_eq!(entry.pos, pos_before);
        assert!(!entry.locked);
    }

    #[test]
    fn test_viewport_zoom_is_clamped() {
        let tree = small_tree();
        let mut view = ViewState::initialize(&tree, &LayoutConfig::default());

        view.set_viewport(10.0, 20.0, 99.0);
        assert_eq!(view.viewport.zoom, Viewport::ZOOM_MAX);

        view.set_viewport(0.0, 0.0, 0.0001);
        assert_eq!(view.viewport.zoom, Viewport::ZOOM_MIN);

        view.set_viewport(0.0, 0.0, f64::NAN);
        assert_eq!(view.viewport.zoom, Viewport::ZOOM_MIN);
    }

    #[test]
    fn test_persisted_zoom_is_clamped_on_deserialize() {
        let too_big: Viewport =
            serde_json::from_str(r#"{ "x": 5.0, "y": -3.0, "zoom": 99.0 }"#).unwrap();
        assert_eq!(too_big.zoom, Viewport::ZOOM_MAX);
        assert_eq!((too_big.x, too_big.y), (5.0, -3.0));

        let too_small: Viewport =
            serde_json::from_str(r#"{ "x": 0.0, "y": 0.0, "zoom": 0.001 }"#).unwrap();
        assert_eq!(too_small.zoom, Viewport::ZOOM_MIN);

        let in_range: Viewport =
            serde_json::from_str(r#"{ "x": 0.0, "y": 0.0, "zoom": 1.5 }"#).unwrap();
        assert_eq!(in_range.zoom, 1.5);
    }

    #[test]
    fn test_legacy_position_field_is_normalized() {
        let json = r#"{
            "position": { "x": 12.5, "y": -3.0 },
            "collapsed": true
        }"#;
        let entry: NodeViewState = serde_json::from_str(json).unwrap();
        assert_eq!(entry.pos, Vec2::new(12.5, -3.0));
        assert!(entry.collapsed);
        assert!(!entry.locked);
    }

    #[test]
    fn test_current_pos_wins_over_legacy() {
        let json = r#"{
            "pos": { "x": 1.0, "y": 2.0 },
            "position": { "x": 9.0, "y": 9.0 },
            "collapsed": false
        }"#;
        let entry: NodeViewState = serde_json::from_str(json).unwrap();
        assert_eq!(entry.pos, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_entry_without_any_position_defaults_to_origin() {
        let entry: NodeViewState = serde_json::from_str(r#"{"collapsed": false}"#).unwrap();
        assert_eq!(entry.pos, Vec2::ZERO);
    }

    #[test]
    fn test_serialization_always_writes_current_field() {
        let entry = NodeViewState::at(Vec2::new(3.0, 4.0));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"pos\""));
        assert!(!json.contains("\"position\""));
    }

    #[test]
    fn test_reconcile_prunes_stale_and_fills_missing() {
        let tree = small_tree();
        let mut view = ViewState::initialize(&tree, &LayoutConfig::default());
        view.node_state
            .insert(NodeId::from("gone"), NodeViewState::at(Vec2::new(5.0, 5.0)));
        view.node_state.remove(&NodeId::from("b"));

        let pruned = view.reconcile(&tree);

        assert_eq!(pruned, 1);
        assert!(view.node(&NodeId::from("gone")).is_none());
        assert_eq!(view.node(&NodeId::from("b")).unwrap().pos, Vec2::ZERO);
        assert_eq!(view.node_state.len(), 3);
    }
}
