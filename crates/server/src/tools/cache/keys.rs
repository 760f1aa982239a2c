//! cache_keys tool implementation.
//!
//! Lists the URLs stored in the active generation, oldest first.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thisday_core::{Error, MediaCache};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Return at most this many keys.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    /// Active generation name.
    pub generation: String,
    /// Total number of entries in the generation.
    pub total: usize,
    /// Keys in insertion order.
    pub keys: Vec<String>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: Option<&MediaCache>, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let cache = cache.ok_or(Error::CacheUnavailable)?;
    let active = cache.open();

    let mut keys = active.keys().await?;
    let total = keys.len();
    if let Some(limit) = params.limit {
        keys.truncate(limit);
    }

    json_result(&CacheKeysOutput { generation: active.name().to_string(), total, keys })
}
