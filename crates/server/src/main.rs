//! mcp-media-cache server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use thisday_client::{Capability, FetchConfig, HttpFetcher};
use thisday_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod handler;
mod state;
mod tools;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let origin = config.origin_url()?;

    tracing::info!(db_path = %config.db_path.display(), "Starting mcp-media-cache server on stdio transport");

    let capability = Capability::probe(&config).await;
    let fetcher = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);
    let state = Arc::new(AppState::new(capability, fetcher, origin, config.intercept_enabled));

    let mut listener = state.hub.connect();
    tokio::spawn(async move {
        while let Some(message) = listener.recv().await {
            tracing::info!(
                kind = %message.kind,
                status = message.status.as_str(),
                url = %message.url,
                "media cache event"
            );
        }
    });

    if let Some(interceptor) = &state.interceptor
        && let Err(e) = interceptor.install().await
    {
        tracing::warn!(error = %e, "interceptor activation failed, requests go straight to the network");
    }

    let handler = handler::McpMediaServer::new(state);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
