//! HTTP surface: the MCP streamable-HTTP transport plus the OpenAPI document.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::CorsLayer;

use crate::error::{Result, ServerError};
use crate::openapi::openapi_document;
use crate::tools::GraphRagTools;

pub const MCP_PATH: &str = "/mcp";
pub const OPENAPI_PATH: &str = "/openapi.json";

/// How long open MCP streams may hold up shutdown once it was requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Build the application router. Each MCP session gets its own clone of
/// `tools`; all clones share the same graph store.
pub fn router(tools: GraphRagTools) -> Router {
    let openapi = Arc::new(openapi_document(&GraphRagTools::tool_definitions()));

    let mcp = StreamableHttpService::new(
        move || Ok(tools.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route(OPENAPI_PATH, get(serve_openapi))
        .with_state(openapi)
        .nest_service(MCP_PATH, mcp)
        .layer(CorsLayer::permissive())
}

async fn serve_openapi(State(document): State<Arc<Value>>) -> Json<Value> {
    Json(document.as_ref().clone())
}

/// Bind the listening socket.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Serve `app` until `shutdown` resolves, then stop accepting connections
/// and wait for in-flight requests. Streams still open after
/// [`SHUTDOWN_GRACE`] are dropped.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let requested = Arc::new(Notify::new());
    let notify = requested.clone();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            notify.notify_one();
        })
        .into_future();

    tokio::select! {
        result = server => result.map_err(ServerError::Serve),
        _ = async {
            requested.notified().await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } => {
            tracing::warn!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Open connections did not close in time");
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C / SIGINT.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down server..."),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
