//! graphrag-graph: Neo4j client for the graph-rag knowledge graph.
//!
//! Every graph read and write from the ingestion pipeline and the tool
//! server flows through this crate. Statements are built here, with
//! caller-supplied labels and relationship types validated before they
//! reach Cypher text, and executed through a pooled Bolt client.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod records;
pub mod statement;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use mutations::{ImportOptions, ImportSummary};
pub use records::Record;
pub use statement::{Identifier, Statement};
pub use store::GraphStore;
