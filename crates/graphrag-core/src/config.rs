//! Configuration management for graph-rag services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`GRAPHRAG__` prefix, `__` section separator)
//! 2. Config file (`graphrag.toml` by default)
//! 3. Defaults

use serde::Deserialize;

use crate::error::GraphRagError;

/// All settings, one section per collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: Neo4jSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub ingest: IngestSettings,
}

/// `[neo4j]`: Bolt connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,
    #[serde(default = "default_neo4j_user")]
    pub user: String,
    #[serde(default = "default_neo4j_password")]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// `[llm]`: extraction model endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Base URL of the Ollama server.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
}

/// `[server]`: MCP/HTTP listener.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// `[ingest]`: batch pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestSettings {
    /// Text file to ingest.
    #[serde(default = "default_ingest_file")]
    pub file: String,
    /// Maximum chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Also write a `Document` node per chunk with `MENTIONS` edges.
    #[serde(default)]
    pub include_source: bool,
    /// Add the `__Entity__` base label to every extracted node.
    #[serde(default)]
    pub base_entity_label: bool,
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "testpassword".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_llm_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3:8b".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ingest_file() -> String {
    "./sample.txt".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            file: default_ingest_file(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            include_source: false,
            base_entity_label: false,
        }
    }
}

impl Settings {
    /// Load settings from `<file_prefix>.toml` (optional) and `GRAPHRAG__*`
    /// environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, GraphRagError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("GRAPHRAG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;

        tracing::debug!(
            neo4j_uri = %settings.neo4j.uri,
            llm_model = %settings.llm.model,
            port = settings.server.port,
            "Settings loaded"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<(), GraphRagError> {
        if self.ingest.chunk_size == 0 {
            return Err(GraphRagError::InvalidSetting {
                key: "ingest.chunk_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(GraphRagError::InvalidSetting {
                key: "ingest.chunk_overlap",
                reason: format!(
                    "{} must be smaller than chunk_size {}",
                    self.ingest.chunk_overlap, self.ingest.chunk_size
                ),
            });
        }
        Ok(())
    }
}
