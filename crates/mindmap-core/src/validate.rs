use crate::{NodeId, SemanticTree};
use std::collections::HashMap;
use thiserror::Error;

/// Structural violation found while checking a candidate tree.
///
/// These are terminal for the tree they describe: the core never repairs a
/// malformed tree, it hands the violation back so the caller can re-ask the
/// generator or abort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("root id `{0}` is not present in the node map")]
    MissingRoot(NodeId),
    #[error("node `{id}` is missing required field `{field}`")]
    MissingField { id: NodeId, field: &'static str },
    #[error("node `{parent}` references child `{child}` which is not in the node map")]
    DanglingChild { parent: NodeId, child: NodeId },
    #[error("cycle through node `{0}` detected while traversing from the root")]
    Cycle(NodeId),
    #[error("node `{child}` is listed as a child of both `{first_parent}` and `{second_parent}`")]
    DuplicateParent {
        child: NodeId,
        first_parent: NodeId,
        second_parent: NodeId,
    },
    #[error("node `{0}` is not reachable from the root")]
    Unreachable(NodeId),
}

/// Checks the structural invariants a [`SemanticTree`] must satisfy before
/// the rest of the core will touch it. Pure: the tree is not modified.
///
/// Violations are reported in a fixed priority order regardless of where
/// they sit in the tree: missing root, then missing required fields, then
/// dangling child references, then cycles, then duplicate parents, then
/// unreachable nodes. Within one category the lexicographically smallest
/// offending id wins, so the same malformed input always produces the same
/// error.
pub fn validate_tree(tree: &SemanticTree) -> Result<(), TreeError> {
    if !tree.contains(&tree.root_id) {
        return Err(TreeError::MissingRoot(tree.root_id.clone()));
    }

    let ids = tree.sorted_ids();

    for id in &ids {
        let node = &tree.nodes[*id];
        if node.id.as_str().is_empty() {
            return Err(TreeError::MissingField {
                id: (*id).clone(),
                field: "id",
            });
        }
        if node.id != **id {
            // A node filed under the wrong key is as unusable as a missing id.
            return Err(TreeError::MissingField {
                id: (*id).clone(),
                field: "id",
            });
        }
        if node.label.trim().is_empty() {
            return Err(TreeError::MissingField {
                id: (*id).clone(),
                field: "label",
            });
        }
    }

    for id in &ids {
        let node = &tree.nodes[*id];
        for child in node.child_ids() {
            if !tree.contains(child) {
                return Err(TreeError::DanglingChild {
                    parent: (*id).clone(),
                    child: child.clone(),
                });
            }
        }
    }

    check_cycles(tree)?;
    check_single_parent(tree)?;

    let reachable = reachable_set(tree);
    for id in &ids {
        if !reachable.contains_key(*id) {
            return Err(TreeError::Unreachable((*id).clone()));
        }
    }

    Ok(())
}

/// Depth-first traversal from the root with an explicit stack. A child that
/// is still on the current path closes a cycle; a child merely seen before
/// is left for the duplicate-parent check so cycles always take priority.
fn check_cycles(tree: &SemanticTree) -> Result<(), TreeError> {
    #[derive(PartialEq)]
    enum Mark {
        OnPath,
        Done,
    }

    let mut marks: HashMap<&NodeId, Mark> = HashMap::new();
    // (node, next child offset); re-pushed until all children are handled.
    let mut stack: Vec<(&NodeId, usize)> = vec![(&tree.root_id, 0)];
    marks.insert(&tree.root_id, Mark::OnPath);

    while let Some((id, child_idx)) = stack.pop() {
        let node = &tree.nodes[id];
        let children = node.child_ids();

        if child_idx >= children.len() {
            marks.insert(id, Mark::Done);
            continue;
        }
        stack.push((id, child_idx + 1));

        let child = &children[child_idx];
        match marks.get(child) {
            Some(Mark::OnPath) => return Err(TreeError::Cycle(child.clone())),
            Some(Mark::Done) => {}
            None => {
                marks.insert(child, Mark::OnPath);
                stack.push((child, 0));
            }
        }
    }

    Ok(())
}

fn check_single_parent(tree: &SemanticTree) -> Result<(), TreeError> {
    let parents = reachable_set(tree);
    let mut seen: HashMap<&NodeId, &NodeId> = HashMap::new();

    // Walk in deterministic order so the reported pair is stable.
    let mut order: Vec<&NodeId> = parents.keys().copied().collect();
    order.sort();

    for parent in order {
        for child in tree.nodes[parent].child_ids() {
            if let Some(&first) = seen.get(child) {
                return Err(TreeError::DuplicateParent {
                    child: child.clone(),
                    first_parent: first.clone(),
                    second_parent: parent.clone(),
                });
            }
            seen.insert(child, parent);
        }
    }

    Ok(())
}

/// Nodes reachable from the root, mapped to the parent they were first
/// reached through (the root maps to itself). Assumes dangling references
/// and cycles were ruled out already.
fn reachable_set(tree: &SemanticTree) -> HashMap<&NodeId, &NodeId> {
    let mut reached: HashMap<&NodeId, &NodeId> = HashMap::new();
    reached.insert(&tree.root_id, &tree.root_id);
    let mut stack = vec![&tree.root_id];

    while let Some(id) = stack.pop() {
        for child in tree.nodes[id].child_ids() {
            if !reached.contains_key(child) {
                reached.insert(child, id);
                stack.push(child);
            }
        }
    }

    reached
}
