use crate::state::{NodeViewState, ViewState};
use mindmap_core::SemanticTree;
use mindmap_layout::{LayoutConfig, layout};

/// Auto-arranges a document after manual edits.
///
/// The layout engine runs from scratch, blind to locking, and the blend step
/// then decides per node: a locked node keeps its existing position exactly,
/// an unlocked node adopts the freshly computed one. Because locking only
/// enters at the blend, an unlocked node ends up precisely where a clean
/// [`layout`] call would have put it no matter how many of its siblings are
/// pinned. Collapsed flags and cosmetic overrides carry over untouched, as
/// does the viewport.
///
/// A node present in the tree but missing from `existing` (content added
/// since the view was built) is treated as unlocked and gets the fresh
/// position. Stale entries for nodes no longer in the tree are not carried
/// into the result.
pub fn relayout(tree: &SemanticTree, existing: &ViewState, config: &LayoutConfig) -> ViewState {
    let fresh = layout(tree, config);
    let mut locked_kept = 0usize;

    let node_state = tree
        .nodes
        .keys()
        .map(|id| {
            let fresh_pos = fresh.positions.get(id).copied().unwrap_or_default();
            let entry = match existing.node(id) {
                Some(current) if current.locked => {
                    locked_kept += 1;
                    current.clone()
                }
                Some(current) => NodeViewState {
                    pos: fresh_pos,
                    ..current.clone()
                },
                None => NodeViewState::at(fresh_pos),
            };
            (id.clone(), entry)
        })
        .collect();

    tracing::debug!(
        nodes = tree.node_count(),
        locked_kept,
        "blended auto-layout with existing view state"
    );

    ViewState {
        viewport: existing.viewport,
        node_state,
    }
}
