//! cache_purge tool implementation.
//!
//! Deletes a single entry, trims to a budget, or both.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thisday_core::{Error, MediaCache};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete the entry stored under this exact URL.
    pub url: Option<String>,

    /// Keep only the newest N entries.
    pub max_entries: Option<usize>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(cache: Option<&MediaCache>, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.url.is_none() && params.max_entries.is_none() {
        return Err(Error::InvalidInput("At least one of url or max_entries must be specified".to_string()).into());
    }

    let cache = cache.ok_or(Error::CacheUnavailable)?;
    let active = cache.open();
    let mut deleted = 0;

    if let Some(url) = params.url
        && active.delete(&url).await?
    {
        deleted += 1;
    }

    if let Some(max_entries) = params.max_entries {
        deleted += cache.trim_to(&active, max_entries).await;
    }

    json_result(&CachePurgeOutput { deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;
    use thisday_core::{CacheDb, CachePolicy, CachedResponse};

    use crate::tools::testing::output;

    async fn cache_with(urls: &[&str]) -> MediaCache {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = MediaCache::new(Arc::new(db), CachePolicy::default());
        let active = cache.open();
        for url in urls {
            active
                .put(&CachedResponse::new(*url, 200, Vec::new(), Bytes::from_static(b"x")))
                .await
                .unwrap();
        }
        cache
    }

    #[tokio::test]
    async fn test_purge_by_url() {
        let cache = cache_with(&["https://a.example/1", "https://a.example/2"]).await;

        let params = CachePurgeParams { url: Some("https://a.example/1".to_string()), max_entries: None };
        let out: CachePurgeOutput = output(&purge_impl(Some(&cache), params.clone()).await.unwrap());
        assert_eq!(out.deleted, 1);

        let out: CachePurgeOutput = output(&purge_impl(Some(&cache), params).await.unwrap());
        assert_eq!(out.deleted, 0);
        assert_eq!(cache.open().keys().await.unwrap(), vec!["https://a.example/2"]);
    }

    #[tokio::test]
    async fn test_purge_to_budget() {
        let cache = cache_with(&["https://a.example/1", "https://a.example/2", "https://a.example/3"]).await;

        let params = CachePurgeParams { url: None, max_entries: Some(1) };
        let out: CachePurgeOutput = output(&purge_impl(Some(&cache), params).await.unwrap());
        assert_eq!(out.deleted, 2);
        assert_eq!(cache.open().keys().await.unwrap(), vec!["https://a.example/3"]);
    }

    #[tokio::test]
    async fn test_purge_no_params() {
        let cache = cache_with(&[]).await;
        assert!(purge_impl(Some(&cache), CachePurgeParams::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_purge_unavailable() {
        let params = CachePurgeParams { url: None, max_entries: Some(1) };
        assert!(purge_impl(None, params).await.is_err());
    }
}
