//! Pooled Bolt client used by the tool server and the ingestion pipeline.

use graphrag_core::config::Neo4jSettings;
use neo4rs::{ConfigBuilder, Graph, Query};

use crate::records::{self, Record};
use crate::statement::Statement;

/// Everything that can go wrong between a statement and its records.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Cannot reach Neo4j: {0}")]
    Connection(String),

    #[error("Neo4j rejected the statement: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Invalid {kind} {value:?}: expected letters, digits and underscores, not starting with a digit")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("Statement references ${0} but no such parameter is bound")]
    UnboundParameter(String),

    #[error("Cannot encode records: {0}")]
    Serialization(String),
}

/// Bolt endpoint, credentials and pool sizing.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jSettings::default())
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Handle to the connection pool.
///
/// Each query checks a connection out of the pool for its duration, so
/// concurrent tool calls never share a single session. Clones share the pool.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Build the pool and verify the endpoint answers.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Run a query, discarding any rows.
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }

    /// Execute a [`Statement`] and convert each row into a JSON record keyed
    /// by the statement's result columns.
    pub async fn query_records(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        if let Some(missing) = statement.unbound_placeholders().into_iter().next() {
            return Err(GraphError::UnboundParameter(missing));
        }

        let rows = self.query_rows(statement.to_query()).await?;
        tracing::debug!(rows = rows.len(), "Statement executed");

        Ok(rows
            .iter()
            .map(|row| records::row_to_record(row, &statement.columns))
            .collect())
    }

    /// Open an explicit transaction; used by the bulk import only.
    pub async fn start_txn(&self) -> Result<neo4rs::Txn, GraphError> {
        Ok(self.graph.start_txn().await?)
    }
}
