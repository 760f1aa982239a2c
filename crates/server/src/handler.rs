//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::cache::{
    CacheClearParams, CacheKeysParams, CachePurgeParams, clear_impl, keys_impl, purge_impl,
};
use crate::tools::media_blob::{BlobReleaseParams, MediaBlobParams, blob_impl, release_impl};
use crate::tools::media_ensure_cached::{EnsureCachedParams, ensure_cached_impl};
use crate::tools::media_fetch::{MediaFetchParams, fetch_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for the media cache.
#[derive(Clone)]
pub struct McpMediaServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl McpMediaServer {
    /// Create a new server handler over shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }

    /// Fetch a URL through the media cache interceptor.
    #[tool(
        description = "Fetch a URL the way the app would. Full-resolution media is served from the cache when present. Returns status, cache source, size and digest."
    )]
    async fn media_fetch(&self, params: Parameters<MediaFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }

    #[tool(description = "Make sure a full-resolution media URL is cached, fetching it fresh on a miss.")]
    async fn media_ensure_cached(&self, params: Parameters<EnsureCachedParams>) -> Result<CallToolResult, McpError> {
        ensure_cached_impl(&self.state, params.0).await
    }

    #[tool(
        description = "Get a blob handle for a media URL. Uses the cached copy unless refresh is set or it is missing."
    )]
    async fn media_blob(&self, params: Parameters<MediaBlobParams>) -> Result<CallToolResult, McpError> {
        blob_impl(&self.state, params.0).await
    }

    #[tool(description = "Release a blob handle returned by media_blob.")]
    async fn media_blob_release(&self, params: Parameters<BlobReleaseParams>) -> Result<CallToolResult, McpError> {
        release_impl(&self.state, params.0).await
    }

    #[tool(description = "List the URLs stored in the active cache generation, oldest first.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(self.state.capability.media_cache().map(|c| c.as_ref()), params.0).await
    }

    #[tool(description = "Delete a cached URL and/or trim the cache to the newest N entries.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(self.state.capability.media_cache().map(|c| c.as_ref()), params.0).await
    }

    #[tool(description = "Delete every media cache generation, the active one included. Returns the count.")]
    async fn cache_clear(&self, params: Parameters<CacheClearParams>) -> Result<CallToolResult, McpError> {
        clear_impl(self.state.capability.media_cache().map(|c| c.as_ref()), params.0).await
    }
}

impl ServerHandler for McpMediaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-media-cache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
