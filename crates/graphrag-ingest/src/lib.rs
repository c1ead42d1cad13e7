//! graphrag-ingest: batch ingestion into the graph-rag knowledge graph.
//!
//! Reads one text file, splits it into overlapping markdown-aware chunks,
//! asks an LLM to extract entities and relationships from every chunk, and
//! bulk-writes the resulting graph documents to Neo4j.

pub mod error;
pub mod extract;
pub mod pipeline;
pub mod splitter;
