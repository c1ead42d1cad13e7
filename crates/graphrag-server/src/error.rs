//! Error types for the graphrag-server crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] graphrag_graph::GraphError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
