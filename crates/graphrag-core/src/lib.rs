//! graphrag-core: Shared types, configuration, and error handling for graph-rag.
//!
//! This crate provides the foundational pieces used by the ingestion
//! pipeline and the MCP tool server:
//! - Graph-document types (nodes, relationships, source chunks) produced by
//!   LLM extraction and written to Neo4j
//! - Layered configuration (file, environment, defaults)
//! - The top-level error type

pub mod config;
pub mod error;
pub mod types;

pub use config::Settings;
pub use error::GraphRagError;
pub use types::{ChunkMetadata, GraphDocument, GraphNode, GraphRelationship, SourceDocument};
