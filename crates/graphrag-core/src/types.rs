//! Graph-document types shared by extraction, import, and the tool server.
//!
//! A [`GraphDocument`] is what the extractor produces for one text chunk:
//! the entities and relationships it found plus the chunk they came from.

use serde::{Deserialize, Serialize};

/// Free-form property map attached to nodes and relationships.
pub type Properties = serde_json::Map<String, serde_json::Value>;

// ── Source Chunks ─────────────────────────────────────────────────

/// Where a chunk sits in the document it was split from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Path or name of the source document.
    pub source: String,
    /// Zero-based position of the chunk in split order.
    pub chunk_index: usize,
    /// First source line covered by the chunk (1-based, inclusive).
    pub line_from: usize,
    /// Last source line covered by the chunk (1-based, inclusive).
    pub line_to: usize,
}

/// A chunk of source text, addressable by the BLAKE3 digest of its content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    /// Hex-encoded BLAKE3 hash of `page_content`.
    pub id: String,
    pub page_content: String,
    pub metadata: ChunkMetadata,
}

impl SourceDocument {
    pub fn new(page_content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        let page_content = page_content.into();
        let id = blake3::hash(page_content.as_bytes()).to_hex().to_string();
        Self {
            id,
            page_content,
            metadata,
        }
    }
}

// ── Extracted Graph ───────────────────────────────────────────────

/// An entity extracted from text. `id` doubles as the entity's name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: Properties::new(),
        }
    }
}

/// A directed, typed relationship between two extracted entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphRelationship {
    pub source: GraphNode,
    pub target: GraphNode,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl GraphRelationship {
    pub fn new(source: GraphNode, target: GraphNode, rel_type: impl Into<String>) -> Self {
        Self {
            source,
            target,
            rel_type: rel_type.into(),
            properties: Properties::new(),
        }
    }
}

/// The extraction result for one source chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
    pub source: SourceDocument,
}

impl GraphDocument {
    /// True when extraction found nothing worth writing.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}
