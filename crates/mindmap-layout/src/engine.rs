use crate::config::{LayoutConfig, LayoutDirection};
use crate::geometry::{Bounds, Vec2};
use mindmap_core::{NodeId, SemanticTree};
use std::collections::HashMap;

/// Positions (box centers) for every node in the tree, plus the bounding box
/// they span after centering.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub positions: HashMap<NodeId, Vec2>,
    pub bounds: Bounds,
}

/// Computes a position for every node of a validated tree.
///
/// Deterministic and pure: the same tree and config always produce the same
/// position map, and no previous view state is consulted. Three passes:
/// a post-order subtree-width pass, a pre-order slot-assignment pass with the
/// root at the origin, and a final translation that centers the whole tree's
/// bounding box on the origin.
///
/// Precondition: the tree passed [`mindmap_core::validate_tree`]. Dangling
/// child references or cycles here are a caller bug, not a recoverable
/// condition.
pub fn layout(tree: &SemanticTree, config: &LayoutConfig) -> LayoutResult {
    let mut widths = HashMap::with_capacity(tree.node_count());
    subtree_width(tree, &tree.root_id, config, &mut widths);

    // Positions are computed on a (breadth, depth) plane and transposed to
    // screen axes afterwards, so left-to-right growth reuses the same slot
    // arithmetic as top-to-bottom.
    let mut plane = HashMap::with_capacity(tree.node_count());
    assign_positions(tree, &tree.root_id, 0.0, 0.0, &widths, config, &mut plane);

    let mut positions: HashMap<NodeId, Vec2> = plane
        .into_iter()
        .map(|(id, (breadth, depth))| {
            let pos = match config.direction {
                LayoutDirection::TopToBottom => Vec2::new(breadth, depth),
                LayoutDirection::LeftToRight => Vec2::new(depth, breadth),
            };
            (id, pos)
        })
        .collect();

    let center = Bounds::of(positions.values()).center();
    for pos in positions.values_mut() {
        pos.x -= center.x;
        pos.y -= center.y;
    }

    let bounds = Bounds::of(positions.values());
    LayoutResult { positions, bounds }
}

/// Breadth of one node box on the layout plane: the node's width when levels
/// stack vertically, its height when they stack horizontally.
fn breadth_unit(config: &LayoutConfig) -> f64 {
    match config.direction {
        LayoutDirection::TopToBottom => config.node_width,
        LayoutDirection::LeftToRight => config.node_height,
    }
}

/// Distance between a parent level and its child level, measured along the
/// growth axis.
fn depth_step(config: &LayoutConfig) -> f64 {
    match config.direction {
        LayoutDirection::TopToBottom => config.node_height + config.vertical_gap,
        LayoutDirection::LeftToRight => config.node_width + config.vertical_gap,
    }
}

/// Post-order pass. A leaf's subtree occupies one box breadth; an internal
/// node needs at least the sum of its children's subtree breadths plus the
/// sibling gaps, and never less than its own box.
fn subtree_width(
    tree: &SemanticTree,
    id: &NodeId,
    config: &LayoutConfig,
    widths: &mut HashMap<NodeId, f64>,
) -> f64 {
    let node = &tree.nodes[id];
    let children = node.child_ids();

    let width = if children.is_empty() {
        breadth_unit(config)
    } else {
        let mut total = 0.0;
        for child in children {
            total += subtree_width(tree, child, config, widths);
        }
        total += (children.len() - 1) as f64 * config.horizontal_gap;
        breadth_unit(config).max(total)
    };

    widths.insert(id.clone(), width);
    width
}

/// Pre-order pass. Each child is centered within its own subtree-width slot;
/// the run of slots is itself centered under the parent.
fn assign_positions(
    tree: &SemanticTree,
    id: &NodeId,
    breadth: f64,
    depth: f64,
    widths: &HashMap<NodeId, f64>,
    config: &LayoutConfig,
    out: &mut HashMap<NodeId, (f64, f64)>,
) {
    out.insert(id.clone(), (breadth, depth));

    let node = &tree.nodes[id];
    let children = node.child_ids();
    if children.is_empty() {
        return;
    }

    let children_total: f64 = children.iter().map(|c| widths[c]).sum::<f64>()
        + (children.len() - 1) as f64 * config.horizontal_gap;

    let child_depth = depth + depth_step(config);
    let mut cursor = breadth - children_total / 2.0;
    for child in children {
        let slot = widths[child];
        assign_positions(tree, child, cursor + slot / 2.0, child_depth, widths, config, out);
        cursor += slot + config.horizontal_gap;
    }
}
