use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mindmap_core::{NodeId, SemanticTree, TreeError, validate_tree};
use mindmap_layout::LayoutConfig;
use mindmap_view::{ViewError, ViewState, relayout};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

pub mod demo;

pub use demo::generate_demo_document;

pub const DOC_VERSION: &str = "1.0";

pub const TITLE_MAX_LEN: usize = 200;
pub const MAX_DEPTH_RANGE: std::ops::RangeInclusive<u32> = 1..=10;
pub const MAX_NODES_RANGE: std::ops::RangeInclusive<u32> = 5..=200;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocError {
    #[error("title must be 1-{TITLE_MAX_LEN} characters")]
    InvalidTitle,
    #[error("max depth must be between 1 and 10, got {0}")]
    InvalidMaxDepth(u32),
    #[error("max nodes must be between 5 and 200, got {0}")]
    InvalidMaxNodes(u32),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Study,
    Executive,
    Legal,
    Technical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Topic,
    Text,
    Pdf,
}

/// Where the document's content came from. Opaque to layout and view; kept
/// for provenance display and evidence lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    #[serde(rename_all = "camelCase")]
    Pdf {
        source_id: String,
        file_name: String,
        storage_url: String,
        page_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        source_id: String,
        name: String,
        char_count: u64,
    },
    #[serde(rename_all = "camelCase")]
    Topic { source_id: String, query: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub title: String,
    pub style_preset: StylePreset,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source_type: SourceType,
    pub max_depth: u32,
    pub max_nodes: u32,
}

impl DocumentMeta {
    pub fn new(
        title: impl Into<String>,
        style_preset: StylePreset,
        source_type: SourceType,
        max_depth: u32,
        max_nodes: u32,
    ) -> Result<Self, DocError> {
        let title = title.into().trim().to_string();
        if title.is_empty() || title.chars().count() > TITLE_MAX_LEN {
            return Err(DocError::InvalidTitle);
        }
        if !MAX_DEPTH_RANGE.contains(&max_depth) {
            return Err(DocError::InvalidMaxDepth(max_depth));
        }
        if !MAX_NODES_RANGE.contains(&max_nodes) {
            return Err(DocError::InvalidMaxNodes(max_nodes));
        }

        let now = Utc::now();
        Ok(Self {
            title,
            style_preset,
            created_at: now,
            updated_at: now,
            source_type,
            max_depth,
            max_nodes,
        })
    }
}

/// One complete mind map: immutable semantic content plus its mutable view
/// overlay and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapDocument {
    pub id: Uuid,
    pub version: String,
    pub meta: DocumentMeta,
    pub semantic: SemanticTree,
    pub view: ViewState,
    pub sources: Vec<Source>,
}

impl MindMapDocument {
    /// Accepts a candidate tree from the generator. The tree is validated
    /// first; on success an initial view state is computed with the default
    /// layout so the document is renderable immediately.
    pub fn accept(
        tree: SemanticTree,
        meta: DocumentMeta,
        sources: Vec<Source>,
    ) -> Result<Self, DocError> {
        validate_tree(&tree)?;
        let view = ViewState::initialize(&tree, &LayoutConfig::default());
        tracing::info!(
            title = %meta.title,
            nodes = tree.node_count(),
            "accepted generated tree into a new document"
        );
        Ok(Self {
            id: Uuid::new_v4(),
            version: DOC_VERSION.to_string(),
            meta,
            semantic: tree,
            view,
            sources,
        })
    }

    /// Drag-end callback from the renderer. Locks the node as part of the
    /// same transition and stamps the document dirty time.
    pub fn set_node_position(&mut self, id: &NodeId, x: f64, y: f64) -> Result<(), ViewError> {
        self.view.set_position(id, x, y)?;
        self.meta.updated_at = Utc::now();
        Ok(())
    }

    pub fn toggle_collapsed(&mut self, id: &NodeId) -> Result<bool, ViewError> {
        let collapsed = self.view.toggle_collapsed(id)?;
        self.meta.updated_at = Utc::now();
        Ok(collapsed)
    }

    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) {
        self.view.set_viewport(x, y, zoom);
        self.meta.updated_at = Utc::now();
    }

    /// "Auto-arrange": recompute positions for everything the user has not
    /// pinned, then swap the view in as one replacement.
    pub fn auto_arrange(&mut self, config: &LayoutConfig) {
        self.view = relayout(&self.semantic, &self.view, config);
        self.meta.updated_at = Utc::now();
    }

    /// Loads a persisted `{tree, view}` pair. Legacy position fields are
    /// normalized during deserialization; afterwards the view is reconciled
    /// against the tree so stale entries are dropped and newly appeared
    /// nodes get a default entry instead of failing the load.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading document from {}", path.display()))?;
        let mut doc: MindMapDocument =
            serde_json::from_str(&content).context("parsing document JSON")?;

        validate_tree(&doc.semantic)
            .with_context(|| format!("document {} has a malformed tree", doc.id))?;

        let pruned = doc.view.reconcile(&doc.semantic);
        if pruned > 0 {
            tracing::warn!(pruned, "dropped stale view entries while loading document");
        }
        tracing::info!(title = %doc.meta.title, "document loaded");
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("serializing document")?;
        fs::write(path, content)
            .with_context(|| format!("writing document to {}", path.display()))?;
        tracing::info!(title = %self.meta.title, "document saved");
        Ok(())
    }
}
