//! MCP tool handlers over the knowledge graph.
//!
//! Each tool turns its typed request into one [`Statement`] and hands it to
//! the [`GraphStore`]. Results are returned as pretty-printed JSON records
//! inside a single text content item. Any failure, whether an identifier
//! that does not pass validation or a query the database rejects, is logged
//! with its cause and reported to the caller as [`QUERY_FAILED`].

use std::future::Future;
use std::sync::Arc;

use graphrag_graph::{mutations, queries, GraphError, GraphStore, Record, Statement};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const SERVER_NAME: &str = "graph-rag-server";

/// Text returned to the caller for every failed tool call.
pub const QUERY_FAILED: &str = "Failed to query Neo4j";

// ── Requests ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRelatedNodesRequest {
    /// Name of the node whose outgoing neighbours are returned
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRelationshipRequest {
    /// Name of the node the relationship starts at
    pub from_name: String,
    /// Name of the node the relationship points to
    pub to_name: String,
    /// Relationship type, e.g. KNOWS (letters, digits and underscores)
    pub relationship_type: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddNodeRequest {
    /// Node label, e.g. Person (letters, digits and underscores)
    pub label: String,
    /// Value of the node's name property
    pub name: String,
    /// Additional properties stored on the node
    #[serde(default)]
    pub properties: Map<String, Value>,
}

// ── Handler ──────────────────────────────────────────────────────

/// Tool context shared by every MCP session.
#[derive(Clone)]
pub struct GraphRagTools {
    store: Arc<dyn GraphStore>,
    tool_router: ToolRouter<Self>,
}

impl GraphRagTools {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    /// Name, description and input schema of every registered tool.
    pub fn tool_definitions() -> Vec<Tool> {
        Self::tool_router().list_all()
    }

    async fn query_graph(
        &self,
        tool: &'static str,
        statement: Result<Statement, GraphError>,
    ) -> CallToolResult {
        let records = match statement {
            Ok(statement) => {
                tracing::debug!(tool, cypher = %statement.text, "Executing statement");
                self.store.execute(statement).await
            }
            Err(e) => Err(e),
        };

        match records.and_then(|records| render(&records)) {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(e) => {
                tracing::error!(tool, error = %e, "Error querying Neo4j");
                CallToolResult::error(vec![Content::text(QUERY_FAILED)])
            }
        }
    }
}

fn render(records: &[Record]) -> Result<String, GraphError> {
    serde_json::to_string_pretty(records).map_err(|e| GraphError::Serialization(e.to_string()))
}

#[tool_router]
impl GraphRagTools {
    #[tool(
        name = "get-related-nodes",
        description = "Retrieve the nodes reached by an outgoing relationship from the node with the given name"
    )]
    pub async fn get_related_nodes(
        &self,
        Parameters(request): Parameters<GetRelatedNodesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let statement = queries::related_nodes(&request.name);
        Ok(self.query_graph("get-related-nodes", Ok(statement)).await)
    }

    #[tool(
        name = "add-relationship",
        description = "Create a typed relationship between the nodes with the given names"
    )]
    pub async fn add_relationship(
        &self,
        Parameters(request): Parameters<AddRelationshipRequest>,
    ) -> Result<CallToolResult, McpError> {
        let statement = mutations::create_relationship(
            &request.from_name,
            &request.to_name,
            &request.relationship_type,
        );
        Ok(self.query_graph("add-relationship", statement).await)
    }

    #[tool(
        name = "add-node",
        description = "Create a node with the given label, name and properties"
    )]
    pub async fn add_node(
        &self,
        Parameters(request): Parameters<AddNodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let statement =
            mutations::create_node(&request.label, &request.name, &request.properties);
        Ok(self.query_graph("add-node", statement).await)
    }
}

#[tool_handler]
impl ServerHandler for GraphRagTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Query and extend a Neo4j knowledge graph. Nodes are addressed by their name property."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use graphrag_core::GraphDocument;
    use graphrag_graph::{ImportOptions, ImportSummary};
    use serde_json::json;

    /// Records every statement and answers with a canned response.
    struct FakeStore {
        statements: Mutex<Vec<Statement>>,
        response: Result<Vec<Record>, String>,
    }

    impl FakeStore {
        fn returning(records: Vec<Record>) -> Arc<Self> {
            Arc::new(Self {
                statements: Mutex::new(Vec::new()),
                response: Ok(records),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                statements: Mutex::new(Vec::new()),
                response: Err(reason.to_string()),
            })
        }

        fn statements(&self) -> Vec<Statement> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GraphStore for FakeStore {
        async fn execute(&self, statement: Statement) -> Result<Vec<Record>, GraphError> {
            self.statements.lock().unwrap().push(statement);
            self.response.clone().map_err(GraphError::Connection)
        }

        async fn add_graph_documents(
            &self,
            _documents: &[GraphDocument],
            _options: &ImportOptions,
        ) -> Result<ImportSummary, GraphError> {
            Ok(ImportSummary::default())
        }
    }

    /// (text, is_error) of a single-item result.
    fn outcome(result: &CallToolResult) -> (String, bool) {
        let value = serde_json::to_value(result).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap().to_string();
        let is_error = value["isError"].as_bool().unwrap_or(false);
        (text, is_error)
    }

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_unknown_name_returns_empty_list() {
        let store = FakeStore::returning(Vec::new());
        let tools = GraphRagTools::new(store.clone());

        let result = tools
            .get_related_nodes(Parameters(GetRelatedNodesRequest {
                name: "Nobody".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(outcome(&result), ("[]".to_string(), false));
        let statements = store.statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].params["name"], "Nobody");
    }

    #[tokio::test]
    async fn test_related_nodes_are_rendered_as_json() {
        let bob = record(json!({
            "m": { "identity": 7, "labels": ["Person"], "properties": { "name": "Bob" } }
        }));
        let tools = GraphRagTools::new(FakeStore::returning(vec![bob.clone()]));

        let result = tools
            .get_related_nodes(Parameters(GetRelatedNodesRequest {
                name: "Alice".to_string(),
            }))
            .await
            .unwrap();

        let (text, is_error) = outcome(&result);
        assert!(!is_error);
        let parsed: Vec<Record> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![bob]);
        assert!(text.contains('\n'));
    }

    #[tokio::test]
    async fn test_add_relationship_binds_names() {
        let store = FakeStore::returning(Vec::new());
        let tools = GraphRagTools::new(store.clone());

        let result = tools
            .add_relationship(Parameters(AddRelationshipRequest {
                from_name: "Alice".to_string(),
                to_name: "Bob".to_string(),
                relationship_type: "KNOWS".to_string(),
            }))
            .await
            .unwrap();

        assert!(!outcome(&result).1);
        let statements = store.statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].text.contains("[r:`KNOWS`]"));
        assert_eq!(statements[0].params["fromName"], "Alice");
        assert_eq!(statements[0].params["toName"], "Bob");
        assert!(statements[0].unbound_placeholders().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_relationship_type_never_reaches_store() {
        let store = FakeStore::returning(Vec::new());
        let tools = GraphRagTools::new(store.clone());

        let result = tools
            .add_relationship(Parameters(AddRelationshipRequest {
                from_name: "Alice".to_string(),
                to_name: "Bob".to_string(),
                relationship_type: "KNOWS]->(x) DETACH DELETE x //".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(outcome(&result), (QUERY_FAILED.to_string(), true));
        assert!(store.statements().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_label_never_reaches_store() {
        let store = FakeStore::returning(Vec::new());
        let tools = GraphRagTools::new(store.clone());

        let result = tools
            .add_node(Parameters(AddNodeRequest {
                label: "Person`) MATCH (m".to_string(),
                name: "Alice".to_string(),
                properties: Map::new(),
            }))
            .await
            .unwrap();

        assert_eq!(outcome(&result), (QUERY_FAILED.to_string(), true));
        assert!(store.statements().is_empty());
    }

    #[tokio::test]
    async fn test_add_node_creates_with_properties() {
        let store = FakeStore::returning(Vec::new());
        let tools = GraphRagTools::new(store.clone());

        let mut properties = Map::new();
        properties.insert("age".to_string(), json!(30));

        tools
            .add_node(Parameters(AddNodeRequest {
                label: "Person".to_string(),
                name: "Alice".to_string(),
                properties,
            }))
            .await
            .unwrap();

        let statements = store.statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].text.starts_with("CREATE (n:`Person`)"));
        assert_eq!(statements[0].params["name"], "Alice");
        assert_eq!(statements[0].params["properties"], json!({ "age": 30 }));
    }

    #[tokio::test]
    async fn test_backend_failure_is_generic() {
        let tools = GraphRagTools::new(FakeStore::failing("connection refused"));

        let result = tools
            .get_related_nodes(Parameters(GetRelatedNodesRequest {
                name: "Alice".to_string(),
            }))
            .await
            .unwrap();

        let (text, is_error) = outcome(&result);
        assert!(is_error);
        assert_eq!(text, QUERY_FAILED);
        assert!(!text.contains("refused"));
    }

    #[test]
    fn test_registered_tools() {
        let mut names: Vec<String> = GraphRagTools::tool_definitions()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["add-node", "add-relationship", "get-related-nodes"]);
    }

    #[test]
    fn test_server_info_advertises_tools() {
        let tools = GraphRagTools::new(FakeStore::returning(Vec::new()));
        let info = tools.get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }
}
