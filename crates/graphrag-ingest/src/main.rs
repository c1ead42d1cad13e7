//! CLI entry point for graphrag-ingest.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use graphrag_core::Settings;
use graphrag_graph::{GraphClient, GraphConfig, ImportOptions};

use graphrag_ingest::extract::OllamaExtractor;
use graphrag_ingest::pipeline::{exit_status, IngestPipeline, IngestReport};
use graphrag_ingest::splitter::TextSplitter;

#[derive(Parser)]
#[command(name = "graphrag-ingest")]
#[command(about = "Extract a knowledge graph from a text file into Neo4j")]
struct Cli {
    /// Text file to ingest (default: ingest.file from config).
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Maximum chunk length in characters.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks.
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Also write a Document node per chunk linked to the entities it mentions.
    #[arg(long)]
    include_source: bool,

    /// Add the __Entity__ base label to every extracted node.
    #[arg(long)]
    base_entity_label: bool,

    /// Config file prefix (default: graphrag).
    #[arg(short, long, default_value = "graphrag")]
    config: String,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let outcome = run(cli).await;

    match &outcome {
        Ok(report) => tracing::info!(
            chunks = report.chunks,
            graph_documents = report.graph_documents,
            nodes = report.summary.nodes,
            relationships = report.summary.relationships,
            "Ingestion complete"
        ),
        Err(e) => tracing::error!(error = %e, "Ingestion failed"),
    }

    std::process::exit(exit_status(&outcome));
}

async fn run(cli: Cli) -> anyhow::Result<IngestReport> {
    let settings = Settings::load(&cli.config)?;

    let chunk_size = cli.chunk_size.unwrap_or(settings.ingest.chunk_size);
    let chunk_overlap = cli.chunk_overlap.unwrap_or(settings.ingest.chunk_overlap);
    let splitter = TextSplitter::markdown(chunk_size, chunk_overlap)?;

    let graph = GraphClient::connect(&GraphConfig::from(&settings.neo4j)).await?;
    let extractor = OllamaExtractor::new(&settings.llm);
    tracing::info!(model = %settings.llm.model, base_url = %settings.llm.base_url, "Using Ollama extractor");

    let options = ImportOptions {
        include_source: cli.include_source || settings.ingest.include_source,
        base_entity_label: cli.base_entity_label || settings.ingest.base_entity_label,
    };

    let pipeline = IngestPipeline::new(splitter, Arc::new(extractor), Arc::new(graph), options);

    let path = cli
        .file
        .unwrap_or_else(|| PathBuf::from(&settings.ingest.file));
    let report = pipeline.run(&path).await?;
    Ok(report)
}
