//! Fixtures for tool tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;
use thisday_client::header::{self, HeaderMap, HeaderValue};
use thisday_client::{
    Capability, FetchOptions, Fetcher, MediaRequest, MediaResponse, StatusCode, Url,
};
use thisday_core::{CacheDb, CachePolicy, Error, MediaCache};

use crate::state::AppState;

pub const ORIGIN: &str = "https://thisday.example";

/// Serves `body` as image/jpeg for every request.
pub struct StubFetcher {
    body: &'static [u8],
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new(body: &'static [u8]) -> Self {
        Self { body, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &MediaRequest, _options: FetchOptions) -> Result<MediaResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));

        Ok(MediaResponse {
            url: request.url.clone(),
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(self.body),
            fetch_ms: 1,
        })
    }
}

pub fn media_url(asset_id: &str, variant: &str) -> String {
    format!("{ORIGIN}/api/media/immich/{asset_id}?type={variant}")
}

/// State over an in-memory cache with an installed interceptor.
pub async fn persistent_state(fetcher: Arc<StubFetcher>) -> AppState {
    let db = CacheDb::open_in_memory().await.unwrap();
    let cache = Arc::new(MediaCache::new(Arc::new(db), CachePolicy::default()));
    let origin = Url::parse(ORIGIN).unwrap();
    let state = AppState::new(Capability::Persistent(cache), fetcher, Some(origin), true);
    state.interceptor.as_ref().unwrap().install().await.unwrap();
    state
}

pub fn absent_state(fetcher: Arc<StubFetcher>) -> AppState {
    AppState::new(Capability::Absent, fetcher, Url::parse(ORIGIN).ok(), true)
}

/// Parse the JSON text content of a tool result.
pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
