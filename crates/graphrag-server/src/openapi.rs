//! OpenAPI description of the registered tools.
//!
//! Built from the tool router's own definitions so the document always
//! matches the handlers. The `/tools/<name>` paths document the tool inputs;
//! tools are invoked over MCP, not through these paths.

use rmcp::model::Tool;
use serde_json::{json, Map, Value};

pub const TITLE: &str = "Graph RAG Server API";
pub const DESCRIPTION: &str = "API documentation for the Graph RAG Server";

/// Keys of a generated JSON schema that OpenAPI 3.0 does not accept.
const DROPPED_SCHEMA_KEYS: &[&str] = &["$schema", "title"];

pub fn openapi_document(tools: &[Tool]) -> Value {
    let mut paths = Map::new();

    for tool in tools {
        let description = tool.description.as_deref().unwrap_or_default();
        paths.insert(
            format!("/tools/{}", tool.name),
            json!({
                "post": {
                    "operationId": tool.name,
                    "summary": description,
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": { "schema": request_schema(tool) }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": response_description(&tool.name),
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "type": "object" }
                                    }
                                }
                            }
                        },
                        "default": { "description": "Failed to query Neo4j" }
                    }
                }
            }),
        );
    }

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": TITLE,
            "version": env!("CARGO_PKG_VERSION"),
            "description": DESCRIPTION,
        },
        "paths": paths,
    })
}

fn request_schema(tool: &Tool) -> Value {
    let mut schema = tool.input_schema.as_ref().clone();
    for key in DROPPED_SCHEMA_KEYS {
        schema.remove(*key);
    }
    Value::Object(schema)
}

fn response_description(tool: &str) -> &'static str {
    match tool {
        "get-related-nodes" => "A list of related nodes",
        "add-relationship" => "The created relationship",
        "add-node" => "The created node",
        _ => "Records returned by the tool",
    }
}
