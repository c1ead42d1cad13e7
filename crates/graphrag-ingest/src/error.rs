//! Error types for the graphrag-ingest crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid splitter configuration: {0}")]
    Splitter(String),

    #[error("LLM request failed: {0}")]
    Llm(#[from] reqwest::Error),

    #[error("Failed to parse extraction output for chunk {chunk_index}: {reason}")]
    Extraction { chunk_index: usize, reason: String },

    #[error("Graph error: {0}")]
    Graph(#[from] graphrag_graph::GraphError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
