//! graphrag-server: MCP tool server for the graph-rag knowledge graph.
//!
//! Exposes three tools over the streamable-HTTP MCP transport
//! (`get-related-nodes`, `add-relationship`, `add-node`), each translating
//! its typed request into one parameterized Cypher statement, plus an
//! OpenAPI description generated from the same tool registrations.

pub mod error;
pub mod http;
pub mod openapi;
pub mod tools;

pub use error::ServerError;
pub use tools::GraphRagTools;
