//! Write operations for the knowledge graph.
//!
//! Tool-surface writes use CREATE: nothing is ever upserted, so repeated
//! calls produce repeated elements. Bulk import of extracted graph documents
//! uses APOC merge procedures keyed by entity `id`, so re-ingesting the same
//! text converges instead of duplicating.

use graphrag_core::{GraphDocument, GraphNode};
use serde_json::{json, Map, Value};

use crate::client::{GraphClient, GraphError};
use crate::statement::{Identifier, Statement};

/// Label added to every extracted node when `base_entity_label` is set.
pub const BASE_ENTITY_LABEL: &str = "__Entity__";

const BASE_ENTITY_CONSTRAINT: &str =
    "CREATE CONSTRAINT IF NOT EXISTS FOR (b:`__Entity__`) REQUIRE b.id IS UNIQUE";

// ── Tool Mutations ───────────────────────────────────────────────

/// Create a `rel_type` relationship from every node named `from_name` to
/// every node named `to_name`.
///
/// When either endpoint is missing the MATCH yields no rows, so nothing is
/// created and the statement returns no records.
pub fn create_relationship(
    from_name: &str,
    to_name: &str,
    rel_type: &str,
) -> Result<Statement, GraphError> {
    let rel_type = Identifier::parse("relationship type", rel_type)?;
    let cypher = format!(
        "MATCH (a), (b) WHERE a.name = $fromName AND b.name = $toName
         CREATE (a)-[r:{}]->(b)
         RETURN r",
        rel_type.quoted()
    );

    Ok(Statement::new(cypher)
        .param("fromName", from_name)
        .param("toName", to_name)
        .returns("r"))
}

/// Create a new `label` node carrying `properties` plus `name`.
///
/// `name` wins over a `name` key inside `properties`.
pub fn create_node(
    label: &str,
    name: &str,
    properties: &Map<String, Value>,
) -> Result<Statement, GraphError> {
    let label = Identifier::parse("label", label)?;
    let cypher = format!(
        "CREATE (n:{})
         SET n = $properties, n.name = $name
         RETURN n",
        label.quoted()
    );

    Ok(Statement::new(cypher)
        .param("name", name)
        .param("properties", Value::Object(properties.clone()))
        .returns("n"))
}

// ── Bulk Import ──────────────────────────────────────────────────

/// Options for [`GraphClient::add_graph_documents`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Write a `Document` node per source chunk and link it to every entity it
    /// mentions.
    pub include_source: bool,
    /// Merge entities on a shared `__Entity__` label (with a uniqueness
    /// constraint on `id`) and add their type as a secondary label.
    pub base_entity_label: bool,
}

/// Counts of what an import wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub documents: usize,
    pub nodes: usize,
    pub relationships: usize,
}

impl GraphClient {
    /// Write extracted graph documents, one transaction per document.
    ///
    /// Requires the APOC plugin. Entity types and relationship types travel
    /// as parameters to the APOC procedures and are never spliced into
    /// statement text.
    pub async fn add_graph_documents(
        &self,
        documents: &[GraphDocument],
        options: &ImportOptions,
    ) -> Result<ImportSummary, GraphError> {
        if options.base_entity_label {
            self.run(neo4rs::query(BASE_ENTITY_CONSTRAINT)).await?;
        }

        let mut summary = ImportSummary::default();

        for document in documents {
            let statements = import_statements(document, options);
            if statements.is_empty() {
                continue;
            }

            let mut txn = self.start_txn().await?;
            for statement in &statements {
                txn.run(statement.to_query()).await?;
            }
            txn.commit().await?;

            summary.documents += 1;
            summary.nodes += document.nodes.len();
            summary.relationships += document.relationships.len();

            tracing::debug!(
                source_id = %document.source.id,
                chunk_index = document.source.metadata.chunk_index,
                nodes = document.nodes.len(),
                relationships = document.relationships.len(),
                "Graph document imported"
            );
        }

        tracing::info!(
            documents = summary.documents,
            nodes = summary.nodes,
            relationships = summary.relationships,
            "Graph documents imported"
        );
        Ok(summary)
    }
}

/// Build the node and relationship import statements for one document.
///
/// Returns no statements for an empty document unless the source chunk
/// itself is to be written.
pub fn import_statements(document: &GraphDocument, options: &ImportOptions) -> Vec<Statement> {
    let mut statements = Vec::new();

    if !document.nodes.is_empty() || options.include_source {
        statements.push(node_import_statement(document, options));
    }
    if !document.relationships.is_empty() {
        statements.push(relationship_import_statement(document, options));
    }

    statements
}

fn node_import_statement(document: &GraphDocument, options: &ImportOptions) -> Statement {
    let mut cypher = String::new();

    if options.include_source {
        cypher.push_str(
            "MERGE (d:Document {id: $document.id})
             SET d += $document
             WITH d
             ",
        );
    }

    cypher.push_str("UNWIND $data AS row\n");

    let node_var = if options.base_entity_label {
        cypher.push_str(&format!(
            "MERGE (source:`{BASE_ENTITY_LABEL}` {{id: row.id}})
             SET source += row.properties
             "
        ));
        "source"
    } else {
        cypher.push_str("CALL apoc.merge.node([row.type], {id: row.id}, row.properties, {}) YIELD node\n");
        "node"
    };

    if options.include_source {
        cypher.push_str(&format!("MERGE (d)-[:MENTIONS]->({node_var})\n"));
    }

    if options.base_entity_label {
        cypher.push_str(
            "WITH source, row
             CALL apoc.create.addLabels(source, [row.type]) YIELD node
             ",
        );
    }

    cypher.push_str("RETURN count(*) AS imported");

    let data: Vec<Value> = document
        .nodes
        .iter()
        .map(|node| {
            json!({
                "id": node.id,
                "type": node.node_type,
                "properties": entity_properties(node),
            })
        })
        .collect();

    let mut statement = Statement::new(cypher)
        .param("data", Value::Array(data))
        .returns("imported");

    if options.include_source {
        let source = &document.source;
        statement = statement.param(
            "document",
            json!({
                "id": source.id,
                "text": source.page_content,
                "source": source.metadata.source,
                "chunk_index": source.metadata.chunk_index,
                "line_from": source.metadata.line_from,
                "line_to": source.metadata.line_to,
            }),
        );
    }

    statement
}

fn relationship_import_statement(document: &GraphDocument, options: &ImportOptions) -> Statement {
    let endpoints = if options.base_entity_label {
        format!(
            "MERGE (source:`{BASE_ENTITY_LABEL}` {{id: row.source}})
             ON CREATE SET source.name = row.source
             MERGE (target:`{BASE_ENTITY_LABEL}` {{id: row.target}})
             ON CREATE SET target.name = row.target
             "
        )
    } else {
        "CALL apoc.merge.node([row.source_label], {id: row.source}, {name: row.source}, {}) YIELD node AS source
         CALL apoc.merge.node([row.target_label], {id: row.target}, {name: row.target}, {}) YIELD node AS target
         "
        .to_string()
    };

    let cypher = format!(
        "UNWIND $data AS row
         {endpoints}CALL apoc.merge.relationship(source, row.type, {{}}, row.properties, target) YIELD rel
         RETURN count(*) AS imported"
    );

    let data: Vec<Value> = document
        .relationships
        .iter()
        .map(|rel| {
            json!({
                "source": rel.source.id,
                "source_label": rel.source.node_type,
                "target": rel.target.id,
                "target_label": rel.target.node_type,
                "type": rel.rel_type,
                "properties": rel.properties,
            })
        })
        .collect();

    Statement::new(cypher)
        .param("data", Value::Array(data))
        .returns("imported")
}

/// Entity properties with `name` defaulted to the entity id, so extracted
/// entities are reachable through name lookups.
fn entity_properties(node: &GraphNode) -> Map<String, Value> {
    let mut properties = node.properties.clone();
    properties
        .entry("name")
        .or_insert_with(|| Value::String(node.id.clone()));
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphrag_core::{ChunkMetadata, GraphRelationship, SourceDocument};

    fn document() -> GraphDocument {
        let alice = GraphNode::new("Alice", "Person");
        let bob = GraphNode::new("Bob", "Person");
        GraphDocument {
            nodes: vec![alice.clone(), bob.clone()],
            relationships: vec![GraphRelationship::new(alice, bob, "KNOWS")],
            source: SourceDocument::new(
                "Alice knows Bob.",
                ChunkMetadata {
                    source: "sample.txt".to_string(),
                    chunk_index: 0,
                    line_from: 1,
                    line_to: 1,
                },
            ),
        }
    }

    // ── Tool mutations ──

    #[test]
    fn test_create_relationship_binds_placeholder_names() {
        let stmt = create_relationship("Alice", "Bob", "KNOWS").unwrap();
        assert_eq!(stmt.params["fromName"], "Alice");
        assert_eq!(stmt.params["toName"], "Bob");
        assert!(!stmt.params.contains_key("fromNodeId"));
        assert!(!stmt.params.contains_key("toNodeId"));
        assert!(stmt.unbound_placeholders().is_empty());
        assert!(stmt.text.contains("CREATE (a)-[r:`KNOWS`]->(b)"));
        assert_eq!(stmt.columns, vec!["r".to_string()]);
    }

    #[test]
    fn test_create_relationship_rejects_invalid_type() {
        let err = create_relationship("Alice", "Bob", "KNOWS]->(b) DETACH DELETE b //").unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidIdentifier {
                kind: "relationship type",
                ..
            }
        ));
    }

    #[test]
    fn test_create_node_always_creates() {
        let mut props = Map::new();
        props.insert("age".to_string(), json!(30));
        let stmt = create_node("Person", "Alice", &props).unwrap();

        assert!(stmt.text.starts_with("CREATE (n:`Person`)"));
        assert!(!stmt.text.contains("MERGE"));
        assert_eq!(stmt.params["name"], "Alice");
        assert_eq!(stmt.params["properties"], json!({"age": 30}));
        assert!(stmt.unbound_placeholders().is_empty());
    }

    #[test]
    fn test_create_node_rejects_invalid_label() {
        let err = create_node("Person) DELETE (x", "Alice", &Map::new()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidIdentifier { kind: "label", .. }));
    }

    // ── Import ──

    #[test]
    fn test_import_statements_default_options() {
        let statements = import_statements(&document(), &ImportOptions::default());
        assert_eq!(statements.len(), 2);

        let nodes = &statements[0];
        assert!(nodes.text.contains("apoc.merge.node([row.type]"));
        assert!(!nodes.text.contains("Document"));
        assert!(nodes.unbound_placeholders().is_empty());

        let data = nodes.params["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["id"], "Alice");
        assert_eq!(data[0]["type"], "Person");
        assert_eq!(data[0]["properties"]["name"], "Alice");

        let rels = &statements[1];
        assert!(rels.text.contains("apoc.merge.relationship"));
        assert!(!rels.text.contains("KNOWS"));
        assert_eq!(rels.params["data"][0]["type"], "KNOWS");
        assert_eq!(rels.params["data"][0]["source"], "Alice");
        assert_eq!(rels.params["data"][0]["target_label"], "Person");
    }

    #[test]
    fn test_import_statements_with_source() {
        let options = ImportOptions {
            include_source: true,
            ..Default::default()
        };
        let doc = document();
        let statements = import_statements(&doc, &options);

        let nodes = &statements[0];
        assert!(nodes.text.starts_with("MERGE (d:Document"));
        assert!(nodes.text.contains("MERGE (d)-[:MENTIONS]->(node)"));
        assert_eq!(nodes.params["document"]["id"], doc.source.id.as_str());
        assert_eq!(nodes.params["document"]["text"], "Alice knows Bob.");
        assert!(nodes.unbound_placeholders().is_empty());
    }

    #[test]
    fn test_import_statements_with_base_label() {
        let options = ImportOptions {
            base_entity_label: true,
            include_source: true,
        };
        let statements = import_statements(&document(), &options);

        let nodes = &statements[0];
        assert!(nodes.text.contains("MERGE (source:`__Entity__` {id: row.id})"));
        assert!(nodes.text.contains("MERGE (d)-[:MENTIONS]->(source)"));
        assert!(nodes.text.contains("apoc.create.addLabels"));

        let rels = &statements[1];
        assert!(rels.text.contains("MERGE (target:`__Entity__` {id: row.target})"));
        assert!(!rels.text.contains("apoc.merge.node"));
    }

    #[test]
    fn test_empty_document_writes_nothing() {
        let mut doc = document();
        doc.nodes.clear();
        doc.relationships.clear();
        assert!(import_statements(&doc, &ImportOptions::default()).is_empty());

        let with_source = ImportOptions {
            include_source: true,
            ..Default::default()
        };
        assert_eq!(import_statements(&doc, &with_source).len(), 1);
    }

    #[test]
    fn test_explicit_name_property_is_kept() {
        let mut node = GraphNode::new("alice-1", "Person");
        node.properties.insert("name".to_string(), json!("Alice"));
        assert_eq!(entity_properties(&node)["name"], "Alice");
    }
}
