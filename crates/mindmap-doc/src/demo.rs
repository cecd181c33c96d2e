use crate::{DocError, DocumentMeta, MindMapDocument, Source, SourceType, StylePreset};
use mindmap_core::{NodeId, NodeKind, SemanticNode, SemanticTree};

/// Branch templates per style preset: label suffix and semantic kind for the
/// three level-one branches of the starter map.
fn branch_templates(preset: StylePreset) -> [(&'static str, NodeKind); 3] {
    match preset {
        StylePreset::Study => [
            ("Core Concepts", NodeKind::Topic),
            ("Key Definitions", NodeKind::Definition),
            ("Practice Examples", NodeKind::Example),
        ],
        StylePreset::Executive => [
            ("Strategic Overview", NodeKind::Topic),
            ("Key Risks", NodeKind::Risk),
            ("Recommended Actions", NodeKind::Action),
        ],
        StylePreset::Legal => [
            ("Obligations", NodeKind::Topic),
            ("Risks and Liabilities", NodeKind::Risk),
            ("Key Definitions", NodeKind::Definition),
        ],
        StylePreset::Technical => [
            ("Architecture", NodeKind::Topic),
            ("Implementation Details", NodeKind::Detail),
            ("Usage Examples", NodeKind::Example),
        ],
    }
}

/// Builds a small deterministic placeholder document for a title, shaped by
/// the style preset and capped by `max_depth`/`max_nodes`. Stands in where a
/// real generator response is not available (demos, tests, offline mode).
///
/// Node ids are sequential (`node_1` is always the root) so repeated calls
/// with the same inputs produce the same tree.
pub fn generate_demo_document(
    title: &str,
    preset: StylePreset,
    max_depth: u32,
    max_nodes: u32,
) -> Result<MindMapDocument, DocError> {
    let meta = DocumentMeta::new(title, preset, SourceType::Topic, max_depth, max_nodes)?;

    fn make_id(n: u32) -> NodeId {
        NodeId::new(format!("node_{n}"))
    }

    let mut counter = 1u32;
    let root_id = make_id(counter);
    let mut root = SemanticNode::new(root_id.as_str(), truncate(title, 50), NodeKind::Topic);
    root.bullets = Some(vec![
        format!("Overview of {title}"),
        "Key aspects and important considerations".to_string(),
    ]);
    let mut tree = SemanticTree::new(root);

    if max_depth >= 2 {
        let mut branch_ids = Vec::new();
        for (suffix, kind) in branch_templates(preset) {
            if counter >= max_nodes {
                break;
            }
            counter += 1;
            let branch_id = make_id(counter);
            let mut branch =
                SemanticNode::new(branch_id.as_str(), format!("{suffix}: {title}"), kind);

            if max_depth >= 3 {
                let mut leaf_ids = Vec::new();
                for detail in ["Key point", "Supporting detail"] {
                    if counter >= max_nodes {
                        break;
                    }
                    counter += 1;
                    let leaf_id = make_id(counter);
                    tree.nodes.insert(
                        leaf_id.clone(),
                        SemanticNode::new(
                            leaf_id.as_str(),
                            format!("{detail} of {suffix}"),
                            NodeKind::Detail,
                        ),
                    );
                    leaf_ids.push(leaf_id);
                }
                if !leaf_ids.is_empty() {
                    branch.children = Some(leaf_ids);
                }
            }

            tree.nodes.insert(branch_id.clone(), branch);
            branch_ids.push(branch_id);
        }
        if !branch_ids.is_empty() {
            tree.nodes.get_mut(&root_id).unwrap().children = Some(branch_ids);
        }
    }

    let sources = vec![Source::Topic {
        source_id: "demo_1".to_string(),
        query: title.to_string(),
    }];

    MindMapDocument::accept(tree, meta, sources)
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
