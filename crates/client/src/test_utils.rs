//! Shared fixtures for client tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use thisday_core::{CacheDb, CacheStorage, CachedResponse, Error};

use crate::fetch::{FetchOptions, Fetcher, MediaRequest, MediaResponse};

pub fn media_url(asset_id: &str, variant: &str) -> Url {
    Url::parse(&format!("https://thisday.example/api/media/immich/{asset_id}?type={variant}")).unwrap()
}

/// Fetcher answering every request with the same canned response.
pub struct StubFetcher {
    status: StatusCode,
    body: Bytes,
    fail: bool,
    calls: AtomicUsize,
    options: Mutex<Vec<FetchOptions>>,
}

impl StubFetcher {
    pub fn ok(body: &'static [u8]) -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::from_static(body),
            fail: false,
            calls: AtomicUsize::new(0),
            options: Mutex::new(Vec::new()),
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self { status, ..Self::ok(b"") }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::ok(b"") }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn options(&self) -> Vec<FetchOptions> {
        self.options.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &MediaRequest, options: FetchOptions) -> Result<MediaResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.options.lock().unwrap_or_else(PoisonError::into_inner).push(options);

        if self.fail {
            return Err(Error::HttpError("network error: connection refused".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));

        Ok(MediaResponse {
            url: request.url.clone(),
            status: self.status,
            headers,
            body: self.body.clone(),
            fetch_ms: 1,
        })
    }
}

/// Storage whose writes always fail, as under an exceeded quota.
pub struct FailingPutStorage {
    inner: CacheDb,
}

impl FailingPutStorage {
    pub fn new(inner: CacheDb) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CacheStorage for FailingPutStorage {
    async fn lookup(&self, generation: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        self.inner.lookup(generation, url).await
    }

    async fn put(&self, _generation: &str, _response: &CachedResponse) -> Result<(), Error> {
        Err(Error::CorruptEntry("quota exceeded".to_string()))
    }

    async fn keys(&self, generation: &str) -> Result<Vec<String>, Error> {
        self.inner.keys(generation).await
    }

    async fn delete(&self, generation: &str, url: &str) -> Result<bool, Error> {
        self.inner.delete(generation, url).await
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        self.inner.names().await
    }

    async fn delete_generation(&self, generation: &str) -> Result<bool, Error> {
        CacheStorage::delete_generation(&self.inner, generation).await
    }
}
