//! LLM-driven knowledge-graph extraction.
//!
//! The [`GraphExtractor`] trait turns source chunks into graph documents.
//! [`OllamaExtractor`] implements it against an Ollama chat endpoint using
//! structured (JSON-schema constrained) output, one request per chunk.

use async_trait::async_trait;
use graphrag_core::config::LlmSettings;
use graphrag_core::{GraphDocument, GraphNode, GraphRelationship, SourceDocument};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{IngestError, Result};

/// Converts source chunks into graph documents, one per chunk.
#[async_trait]
pub trait GraphExtractor: Send + Sync {
    async fn convert_to_graph_documents(
        &self,
        documents: &[SourceDocument],
    ) -> Result<Vec<GraphDocument>>;
}

const SYSTEM_PROMPT: &str = "\
You build knowledge graphs from text.
Extract the entities mentioned in the text as nodes and the facts that link them as relationships.
- A node id is the entity's name as a human would write it, e.g. \"Marie Curie\". Never use numbers or codes as ids.
- A node type is a short, general category such as \"Person\", \"Organization\", \"Location\" or \"Concept\".
- Use the same id every time an entity is mentioned, even when the text uses a pronoun or abbreviation.
- A relationship type is a short verb phrase in UPPER_SNAKE_CASE, e.g. \"WORKS_AT\". Prefer general types over specific, momentary ones.
- Only extract what the text states. Do not add outside knowledge.
Answer with JSON only.";

/// Ollama `/api/chat` client producing graph documents.
pub struct OllamaExtractor {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaExtractor {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        }
    }

    async fn extract_one(&self, document: &SourceDocument) -> Result<GraphDocument> {
        let body = json!({
            "model": self.model,
            "stream": false,
            "format": extraction_schema(),
            "options": { "temperature": 0 },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Extract the knowledge graph from the following text.\n\nText:\n{}",
                        document.page_content
                    ),
                },
            ],
        });

        let response: ChatResponse = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let raw = parse_extraction(&response.message.content).map_err(|reason| {
            IngestError::Extraction {
                chunk_index: document.metadata.chunk_index,
                reason,
            }
        })?;

        Ok(into_graph_document(raw, document.clone()))
    }
}

#[async_trait]
impl GraphExtractor for OllamaExtractor {
    async fn convert_to_graph_documents(
        &self,
        documents: &[SourceDocument],
    ) -> Result<Vec<GraphDocument>> {
        let mut graph_documents = Vec::with_capacity(documents.len());

        for document in documents {
            let graph_document = self.extract_one(document).await?;
            tracing::info!(
                chunk_index = document.metadata.chunk_index,
                nodes = graph_document.nodes.len(),
                relationships = graph_document.relationships.len(),
                model = %self.model,
                "Chunk extracted"
            );
            graph_documents.push(graph_document);
        }

        Ok(graph_documents)
    }
}

// ── Wire Types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Extraction output exactly as the model produced it.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct RawExtraction {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub relationships: Vec<RawRelationship>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct RawNode {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub node_type: String,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct RawRelationship {
    #[serde(default)]
    pub source_node_id: String,
    #[serde(default)]
    pub source_node_type: String,
    #[serde(default)]
    pub relationship_type: String,
    #[serde(default)]
    pub target_node_id: String,
    #[serde(default)]
    pub target_node_type: String,
}

/// JSON schema handed to Ollama's `format` field.
fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "type": { "type": "string" }
                    },
                    "required": ["id", "type"]
                }
            },
            "relationships": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "source_node_id": { "type": "string" },
                        "source_node_type": { "type": "string" },
                        "relationship_type": { "type": "string" },
                        "target_node_id": { "type": "string" },
                        "target_node_type": { "type": "string" }
                    },
                    "required": [
                        "source_node_id", "source_node_type", "relationship_type",
                        "target_node_id", "target_node_type"
                    ]
                }
            }
        },
        "required": ["nodes", "relationships"]
    })
}

// ── Normalization ────────────────────────────────────────────────

/// Parse the model's message content, tolerating a fenced code block.
pub fn parse_extraction(content: &str) -> std::result::Result<RawExtraction, String> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim()).map_err(|e| e.to_string())
}

/// Normalize raw extraction output into a graph document for `source`.
///
/// Node ids become title-cased names, node types PascalCase, relationship
/// types UPPER_SNAKE. Entries with an empty field are dropped, nodes are
/// deduplicated on (id, type), and relationship endpoints missing from the
/// node list are added to it.
pub fn into_graph_document(raw: RawExtraction, source: SourceDocument) -> GraphDocument {
    let mut nodes: Vec<GraphNode> = Vec::new();

    for raw_node in &raw.nodes {
        if let Some(node) = normalize_node(&raw_node.id, &raw_node.node_type) {
            push_unique(&mut nodes, &node);
        }
    }

    let mut relationships = Vec::new();
    for raw_rel in &raw.relationships {
        let source_node = normalize_node(&raw_rel.source_node_id, &raw_rel.source_node_type);
        let target_node = normalize_node(&raw_rel.target_node_id, &raw_rel.target_node_type);
        let rel_type = relationship_type(&raw_rel.relationship_type);

        let (Some(source_node), Some(target_node), Some(rel_type)) =
            (source_node, target_node, rel_type)
        else {
            tracing::debug!(?raw_rel, "Dropping incomplete relationship");
            continue;
        };

        push_unique(&mut nodes, &source_node);
        push_unique(&mut nodes, &target_node);
        relationships.push(GraphRelationship::new(source_node, target_node, rel_type));
    }

    GraphDocument {
        nodes,
        relationships,
        source,
    }
}

fn push_unique(nodes: &mut Vec<GraphNode>, node: &GraphNode) {
    if !nodes
        .iter()
        .any(|n| n.id == node.id && n.node_type == node.node_type)
    {
        nodes.push(node.clone());
    }
}

fn normalize_node(id: &str, node_type: &str) -> Option<GraphNode> {
    let id = title_case(id)?;
    let node_type = pascal_case(node_type)?;
    Some(GraphNode::new(id, node_type))
}

/// "marie curie" → "Marie Curie"
fn title_case(raw: &str) -> Option<String> {
    let words: Vec<String> = raw.split_whitespace().map(capitalize).collect();
    (!words.is_empty()).then(|| words.join(" "))
}

/// "research institute" → "ResearchInstitute"
fn pascal_case(raw: &str) -> Option<String> {
    let joined: String = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();
    (!joined.is_empty()).then_some(joined)
}

/// "works at" → "WORKS_AT"
fn relationship_type(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .collect();
    (!words.is_empty()).then(|| words.join("_"))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphrag_core::ChunkMetadata;

    fn source() -> SourceDocument {
        SourceDocument::new(
            "Marie Curie worked at the University of Paris.",
            ChunkMetadata {
                source: "sample.txt".to_string(),
                chunk_index: 0,
                line_from: 1,
                line_to: 1,
            },
        )
    }

    #[test]
    fn test_parse_plain_json() {
        let raw = parse_extraction(r#"{"nodes":[{"id":"Alice","type":"Person"}],"relationships":[]}"#)
            .unwrap();
        assert_eq!(raw.nodes.len(), 1);
        assert_eq!(raw.nodes[0].id, "Alice");
        assert!(raw.relationships.is_empty());
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = parse_extraction("```json\n{\"nodes\": [], \"relationships\": []}\n```").unwrap();
        assert_eq!(raw, RawExtraction::default());
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_extraction("Sure! Here is the graph.").is_err());
    }

    #[test]
    fn test_normalization() {
        let raw = RawExtraction {
            nodes: vec![
                RawNode {
                    id: "marie  curie".to_string(),
                    node_type: "person".to_string(),
                },
                RawNode {
                    id: "Marie Curie".to_string(),
                    node_type: "Person".to_string(),
                },
                RawNode {
                    id: " ".to_string(),
                    node_type: "Person".to_string(),
                },
            ],
            relationships: vec![RawRelationship {
                source_node_id: "Marie Curie".to_string(),
                source_node_type: "person".to_string(),
                relationship_type: "worked at".to_string(),
                target_node_id: "university of paris".to_string(),
                target_node_type: "educational institution".to_string(),
            }],
        };

        let doc = into_graph_document(raw, source());

        let ids: Vec<_> = doc.nodes.iter().map(|n| (n.id.as_str(), n.node_type.as_str())).collect();
        assert_eq!(
            ids,
            vec![
                ("Marie Curie", "Person"),
                ("University Of Paris", "EducationalInstitution"),
            ]
        );
        assert_eq!(doc.relationships.len(), 1);
        assert_eq!(doc.relationships[0].rel_type, "WORKED_AT");
        assert_eq!(doc.relationships[0].target.id, "University Of Paris");
        assert_eq!(doc.source, source());
    }

    #[test]
    fn test_incomplete_relationship_dropped() {
        let raw = RawExtraction {
            nodes: vec![],
            relationships: vec![RawRelationship {
                source_node_id: "Alice".to_string(),
                source_node_type: "Person".to_string(),
                relationship_type: "  ".to_string(),
                target_node_id: "Bob".to_string(),
                target_node_type: "Person".to_string(),
            }],
        };
        let doc = into_graph_document(raw, source());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_schema_requires_both_lists() {
        let schema = extraction_schema();
        assert_eq!(schema["required"], json!(["nodes", "relationships"]));
    }
}
