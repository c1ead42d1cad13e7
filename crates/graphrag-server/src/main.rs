//! CLI entry point for the graph-rag MCP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use graphrag_core::Settings;
use graphrag_graph::{GraphClient, GraphConfig};

use graphrag_server::http::{self, MCP_PATH};
use graphrag_server::GraphRagTools;

#[derive(Parser)]
#[command(name = "graphrag-server")]
#[command(about = "MCP tool server for the graph-rag knowledge graph")]
struct Cli {
    /// Port to listen on (default: server.port from config).
    #[arg(short, long, env = "MCP_SERVER_PORT")]
    port: Option<u16>,

    /// Address to bind (default: server.host from config).
    #[arg(long)]
    host: Option<String>,

    /// Config file prefix (default: graphrag).
    #[arg(short, long, default_value = "graphrag")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Error setting up server");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(&cli.config)?;

    let graph = GraphClient::connect(&GraphConfig::from(&settings.neo4j)).await?;
    let tools = GraphRagTools::new(Arc::new(graph));

    let host = cli.host.unwrap_or(settings.server.host);
    let port = cli.port.unwrap_or(settings.server.port);
    let addr = format!("{host}:{port}");

    let listener = http::bind(&addr).await?;
    tracing::info!(mcp_path = MCP_PATH, "Server is running on http://{addr}");

    http::serve(listener, http::router(tools), http::shutdown_signal()).await?;
    tracing::info!("Server shut down");
    Ok(())
}
