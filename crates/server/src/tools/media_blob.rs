//! media_blob and media_blob_release tool implementations.
//!
//! Hands out in-process blob handles for cached media bodies.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thisday_core::Error;

use super::json_result;
use crate::state::AppState;

/// Input parameters for media_blob tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaBlobParams {
    /// Full-resolution media URL, absolute or relative to the origin.
    pub url: String,

    /// Fetch fresh from the network even when cached.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaBlobOutput {
    pub url: String,
    /// Blob handle, absent when nothing could be produced.
    pub handle: Option<String>,
    pub size: Option<usize>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BlobReleaseParams {
    /// A handle previously returned by media_blob.
    pub handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BlobReleaseOutput {
    pub released: bool,
}

pub async fn blob_impl(state: &AppState, params: MediaBlobParams) -> Result<CallToolResult, McpError> {
    let cached = if params.refresh { None } else { state.access.cached_blob_url(&params.url).await? };

    let handle = match cached {
        Some(handle) => Some(handle),
        None => state.access.fetch_and_cache_blob_url(&params.url).await?,
    };

    let blob = handle.as_ref().and_then(|h| state.access.resolve_blob(h.as_str()));
    let output = MediaBlobOutput {
        url: params.url,
        handle: handle.map(|h| h.to_string()),
        size: blob.as_ref().map(|b| b.bytes.len()),
        content_type: blob.and_then(|b| b.content_type),
    };

    json_result(&output)
}

pub async fn release_impl(state: &AppState, params: BlobReleaseParams) -> Result<CallToolResult, McpError> {
    if params.handle.trim().is_empty() {
        return Err(Error::InvalidInput("handle cannot be empty".into()).into());
    }

    json_result(&BlobReleaseOutput { released: state.access.revoke_blob_url(&params.handle) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubFetcher, absent_state, media_url, output, persistent_state};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_blob_then_release() {
        let fetcher = Arc::new(StubFetcher::new(b"jpeg bytes"));
        let state = persistent_state(fetcher.clone()).await;

        let params = MediaBlobParams { url: media_url("abc", "full"), refresh: false };
        let first: MediaBlobOutput = output(&blob_impl(&state, params.clone()).await.unwrap());
        let second: MediaBlobOutput = output(&blob_impl(&state, params).await.unwrap());

        assert_eq!(first.size, Some(10));
        assert_eq!(second.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(fetcher.calls(), 1);

        let handle = first.handle.unwrap();
        assert!(handle.starts_with("blob:thisday/"));

        let release = BlobReleaseParams { handle: handle.clone() };
        let out: BlobReleaseOutput = output(&release_impl(&state, release).await.unwrap());
        assert!(out.released);

        let again: BlobReleaseOutput = output(&release_impl(&state, BlobReleaseParams { handle }).await.unwrap());
        assert!(!again.released);
    }

    #[tokio::test]
    async fn test_blob_refresh_refetches() {
        let fetcher = Arc::new(StubFetcher::new(b"jpeg"));
        let state = persistent_state(fetcher.clone()).await;

        let params = MediaBlobParams { url: media_url("abc", "full"), refresh: true };
        blob_impl(&state, params.clone()).await.unwrap();
        blob_impl(&state, params).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_blob_unavailable() {
        let state = absent_state(Arc::new(StubFetcher::new(b"jpeg")));

        let params = MediaBlobParams { url: media_url("abc", "full"), refresh: false };
        let out: MediaBlobOutput = output(&blob_impl(&state, params).await.unwrap());
        assert!(out.handle.is_none());
        assert!(out.size.is_none());
    }

    #[tokio::test]
    async fn test_release_empty_handle() {
        let state = absent_state(Arc::new(StubFetcher::new(b"")));
        assert!(release_impl(&state, BlobReleaseParams { handle: " ".into() }).await.is_err());
    }
}
