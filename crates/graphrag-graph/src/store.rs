//! The graph-store seam used by the tool server and the ingestion pipeline.

use async_trait::async_trait;
use graphrag_core::GraphDocument;

use crate::client::{GraphClient, GraphError};
use crate::mutations::{ImportOptions, ImportSummary};
use crate::records::Record;
use crate::statement::Statement;

/// Anything that can execute statements and import graph documents.
///
/// [`GraphClient`] is the production implementation; tests substitute
/// in-memory doubles.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Execute one statement and return its rows as records.
    async fn execute(&self, statement: Statement) -> Result<Vec<Record>, GraphError>;

    /// Bulk-write extracted graph documents.
    async fn add_graph_documents(
        &self,
        documents: &[GraphDocument],
        options: &ImportOptions,
    ) -> Result<ImportSummary, GraphError>;
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn execute(&self, statement: Statement) -> Result<Vec<Record>, GraphError> {
        self.query_records(&statement).await
    }

    async fn add_graph_documents(
        &self,
        documents: &[GraphDocument],
        options: &ImportOptions,
    ) -> Result<ImportSummary, GraphError> {
        GraphClient::add_graph_documents(self, documents, options).await
    }
}
