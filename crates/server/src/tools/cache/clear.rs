//! cache_clear tool implementation.
//!
//! Drops every media cache generation, the active one included.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thisday_core::{Error, MediaCache};

use crate::tools::json_result;

/// Parameters for the cache_clear tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearParams {}

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    /// Number of generations deleted.
    pub cleared: usize,
    /// Names of the deleted generations.
    pub generations: Vec<String>,
}

/// Implementation of the cache_clear tool.
pub async fn clear_impl(cache: Option<&MediaCache>, _params: CacheClearParams) -> Result<CallToolResult, McpError> {
    let cache = cache.ok_or(Error::CacheUnavailable)?;
    let generations = cache.clear_all().await?;

    json_result(&CacheClearOutput { cleared: generations.len(), generations })
}
