use crate::state::ViewState;
use mindmap_core::{NodeId, SemanticTree};

/// What the renderer should draw: every node of the tree, and the
/// parent→child edges whose parent is not collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibleGraph {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId)>,
}

/// Projects the tree and the collapse flags into render sets.
///
/// Collapsing never removes anything from the model: every tree node stays
/// in the node set, positions are untouched, and only the collapsed node's
/// outgoing edges disappear. Re-expanding therefore restores the hidden
/// edges with no layout work. A node without a view entry is treated as
/// expanded.
///
/// Both sets come back in lexicographic id order so the renderer's draw
/// order (and any diffing on top of it) is stable across calls.
pub fn project_visibility(tree: &SemanticTree, view: &ViewState) -> VisibleGraph {
    let mut graph = VisibleGraph::default();

    for id in tree.sorted_ids() {
        graph.nodes.push(id.clone());

        let collapsed = view.node(id).is_some_and(|entry| entry.collapsed);
        if collapsed {
            continue;
        }
        for child in tree.nodes[id].child_ids() {
            if tree.contains(child) {
                graph.edges.push((id.clone(), child.clone()));
            }
        }
    }

    graph
}
