//! media_ensure_cached tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Input parameters for media_ensure_cached tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnsureCachedParams {
    /// Full-resolution media URL, absolute or relative to the origin.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnsureCachedOutput {
    pub url: String,
    /// False when no persistent cache is available; the call was a no-op.
    pub available: bool,
}

pub async fn ensure_cached_impl(state: &AppState, params: EnsureCachedParams) -> Result<CallToolResult, McpError> {
    state.access.ensure_cached(&params.url).await?;

    json_result(&EnsureCachedOutput { url: params.url, available: state.access.is_available() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubFetcher, absent_state, media_url, output, persistent_state};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ensure_cached_once() {
        let fetcher = Arc::new(StubFetcher::new(b"jpeg"));
        let state = persistent_state(fetcher.clone()).await;

        for _ in 0..2 {
            let params = EnsureCachedParams { url: media_url("abc", "full") };
            let out: EnsureCachedOutput = output(&ensure_cached_impl(&state, params).await.unwrap());
            assert!(out.available);
        }
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_cached_unavailable() {
        let fetcher = Arc::new(StubFetcher::new(b"jpeg"));
        let state = absent_state(fetcher.clone());

        let params = EnsureCachedParams { url: media_url("abc", "full") };
        let out: EnsureCachedOutput = output(&ensure_cached_impl(&state, params).await.unwrap());
        assert!(!out.available);
        assert_eq!(fetcher.calls(), 0);
    }
}
