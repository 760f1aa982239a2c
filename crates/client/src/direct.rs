//! Direct-access API for contexts without interception.
//!
//! Application code drives the same cache explicitly through
//! [`MediaCacheAccess`]. Where the persistent cache is absent every
//! operation is a quiet no-op, so callers never branch on capability.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;

use thisday_core::{Cache, Error, MediaCache};

use crate::blob::{Blob, BlobRegistry, BlobUrl};
use crate::fetch::{FetchOptions, Fetcher, MediaRequest, MediaResponse, parse_request_url};
use crate::route::MediaRoute;

/// Explicit media cache operations.
#[async_trait]
pub trait MediaCacheAccess: Send + Sync {
    /// Whether a persistent cache backs these operations.
    fn is_available(&self) -> bool;

    /// Make sure `url` is cached, fetching fresh from the network on a miss.
    ///
    /// Network errors propagate; store failures do not.
    async fn ensure_cached(&self, url: &str) -> Result<(), Error>;

    /// Handle to the cached body of `url`, or None if it isn't cached.
    async fn cached_blob_url(&self, url: &str) -> Result<Option<BlobUrl>, Error>;

    /// Fetch `url` fresh, cache it if ok, and hand back the body.
    ///
    /// Returns None when the response is not ok.
    async fn fetch_and_cache_blob_url(&self, url: &str) -> Result<Option<BlobUrl>, Error>;

    /// Dereference a handle issued by this cache.
    fn resolve_blob(&self, handle: &str) -> Option<Blob>;

    /// Release a handle issued by this cache.
    fn revoke_blob_url(&self, handle: &str) -> bool;
}

/// Stand-in used when the persistent cache capability is absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableMediaCache;

#[async_trait]
impl MediaCacheAccess for UnavailableMediaCache {
    fn is_available(&self) -> bool {
        false
    }

    async fn ensure_cached(&self, _url: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn cached_blob_url(&self, _url: &str) -> Result<Option<BlobUrl>, Error> {
        Ok(None)
    }

    async fn fetch_and_cache_blob_url(&self, _url: &str) -> Result<Option<BlobUrl>, Error> {
        Ok(None)
    }

    fn resolve_blob(&self, _handle: &str) -> Option<Blob> {
        None
    }

    fn revoke_blob_url(&self, _handle: &str) -> bool {
        false
    }
}

/// Direct access backed by the shared media cache.
pub struct PersistentMediaCache {
    cache: Arc<MediaCache>,
    fetcher: Arc<dyn Fetcher>,
    route: MediaRoute,
    origin: Option<Url>,
    blobs: BlobRegistry,
}

impl PersistentMediaCache {
    pub fn new(cache: Arc<MediaCache>, fetcher: Arc<dyn Fetcher>, route: MediaRoute, origin: Option<Url>) -> Self {
        Self { cache, fetcher, route, origin, blobs: BlobRegistry::new() }
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    fn parse(&self, url: &str) -> Result<Url, Error> {
        parse_request_url(url, self.origin.as_ref()).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    async fn lookup(&self, cache: &Cache, url: &Url) -> Option<MediaResponse> {
        match cache.lookup(url.as_str()).await {
            Ok(Some(cached)) => match MediaResponse::from_cached(url.clone(), cached) {
                Ok(response) => Some(response),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "cache lookup failed");
                None
            }
        }
    }

    /// Store then trim. Failures are logged and dropped.
    async fn store(&self, cache: &Cache, response: &MediaResponse) {
        if let Err(e) = cache.put(&response.to_cached()).await {
            tracing::warn!(url = %response.url, error = %e, "failed to store media response");
            return;
        }
        self.cache.trim(cache).await;
    }

    fn blob_from(&self, response: &MediaResponse) -> BlobUrl {
        self.blobs.create(Blob {
            content_type: response.content_type().map(str::to_string),
            bytes: response.body.clone(),
        })
    }
}

#[async_trait]
impl MediaCacheAccess for PersistentMediaCache {
    fn is_available(&self) -> bool {
        true
    }

    async fn ensure_cached(&self, url: &str) -> Result<(), Error> {
        let url = self.parse(url)?;
        if !self.route.is_full_media(&url) {
            tracing::debug!(url = %url, "not a full-resolution media URL, nothing to cache");
            return Ok(());
        }

        let cache = self.cache.open();
        if self.lookup(&cache, &url).await.is_some() {
            return Ok(());
        }

        let response = self.fetcher.fetch(&MediaRequest::get(url), FetchOptions::reload()).await?;
        if response.is_ok() {
            self.store(&cache, &response).await;
        }

        Ok(())
    }

    async fn cached_blob_url(&self, url: &str) -> Result<Option<BlobUrl>, Error> {
        let url = self.parse(url)?;
        if !self.route.is_full_media(&url) {
            return Ok(None);
        }

        let cache = self.cache.open();
        Ok(self.lookup(&cache, &url).await.map(|response| self.blob_from(&response)))
    }

    async fn fetch_and_cache_blob_url(&self, url: &str) -> Result<Option<BlobUrl>, Error> {
        let url = self.parse(url)?;
        let eligible = self.route.is_full_media(&url);

        let response = self.fetcher.fetch(&MediaRequest::get(url), FetchOptions::reload()).await?;
        if !response.is_ok() {
            return Ok(None);
        }

        if eligible {
            self.store(&self.cache.open(), &response).await;
        }

        Ok(Some(self.blob_from(&response)))
    }

    fn resolve_blob(&self, handle: &str) -> Option<Blob> {
        self.blobs.resolve(handle)
    }

    fn revoke_blob_url(&self, handle: &str) -> bool {
        self.blobs.revoke(handle)
    }
}
