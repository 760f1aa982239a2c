//! Network fetch for media requests.
//!
//! ### Fetcher seam
//! - `Fetcher` is the only way the cache reaches the network, so the
//!   interception layer and the direct-access API share one transport.
//! - Every HTTP status is returned as a response; deciding what counts as
//!   "ok" belongs to the caller.
//!
//! ### Cache busting
//! - `FetchOptions::reload()` forces a real network read past any
//!   intermediate HTTP cache (`Cache-Control: no-cache`, `Pragma: no-cache`).

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, parse_request_url};

use thisday_core::{AppConfig, CachedResponse, Error};

/// An outgoing media request.
#[derive(Debug, Clone)]
pub struct MediaRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl MediaRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new() }
    }

    /// A plain GET with no headers.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether this is a partial-content request.
    pub fn has_range(&self) -> bool {
        self.headers.contains_key(header::RANGE)
    }
}

/// Per-request fetch behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bypass intermediate HTTP caches.
    pub reload: bool,
}

impl FetchOptions {
    pub fn reload() -> Self {
        Self { reload: true }
    }
}

/// A response from the network or replayed from the cache.
#[derive(Debug, Clone)]
pub struct MediaResponse {
    /// The request URL (also the cache key)
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Bytes,
    /// Time taken to fetch in milliseconds (0 when replayed)
    pub fetch_ms: u64,
}

impl MediaResponse {
    /// Whether the status is in the success range.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Copy into a storable entry. The body is shared, not consumed, so the
    /// response stays usable by the caller.
    pub fn to_cached(&self) -> CachedResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        CachedResponse::new(self.url.as_str(), self.status.as_u16(), headers, self.body.clone())
    }

    /// Rebuild a response from a stored entry.
    pub fn from_cached(url: Url, cached: CachedResponse) -> Result<Self, Error> {
        let status = StatusCode::from_u16(cached.status)
            .map_err(|e| Error::CorruptEntry(format!("{}: {e}", cached.url)))?;

        let mut headers = HeaderMap::with_capacity(cached.headers.len());
        for (name, value) in &cached.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::CorruptEntry(format!("{}: {e}", cached.url)))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| Error::CorruptEntry(format!("{}: {e}", cached.url)))?;
            headers.append(name, value);
        }

        Ok(Self { url, status, headers, body: cached.body, fetch_ms: 0 })
    }
}

/// Something that can perform a media request over the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &MediaRequest, options: FetchOptions) -> Result<MediaResponse, Error>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "thisday-media/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 256MB)
    pub max_bytes: usize,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "thisday-media/0.1".to_string(), max_bytes: 256 * 1024 * 1024, timeout: None }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), max_bytes: config.max_bytes, timeout: config.timeout() }
    }
}

/// `Fetcher` backed by reqwest.
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::HttpError(format!("network error: {}", err))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &MediaRequest, options: FetchOptions) -> Result<MediaResponse, Error> {
        let start = Instant::now();

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if options.reload {
            builder = builder
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        let response = builder.send().await.map_err(transport_error)?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                body.len(),
                self.config.max_bytes
            )));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            fetch_ms,
            body.len()
        );

        Ok(MediaResponse { url: request.url.clone(), status, headers, body, fetch_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_url() -> Url {
        Url::parse("https://thisday.example/api/media/immich/abc123?type=full").unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "thisday-media/0.1");
        assert_eq!(config.max_bytes, 256 * 1024 * 1024);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { timeout_ms: Some(5_000), max_bytes: 1024, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.max_bytes, 1024);
    }

    #[test]
    fn test_request_range_detection() {
        let plain = MediaRequest::get(media_url());
        assert!(!plain.has_range());

        let ranged = plain.with_header(header::RANGE, HeaderValue::from_static("bytes=0-1"));
        assert!(ranged.has_range());
    }

    #[test]
    fn test_cached_round_trip_preserves_response() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("4"));
        let response = MediaResponse {
            url: media_url(),
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"jpeg"),
            fetch_ms: 12,
        };

        let cached = response.to_cached();
        assert_eq!(cached.url, media_url().as_str());
        assert_eq!(cached.content_type.as_deref(), Some("image/jpeg"));

        let replayed = MediaResponse::from_cached(media_url(), cached).unwrap();
        assert_eq!(replayed.status, StatusCode::OK);
        assert_eq!(replayed.body, response.body);
        assert_eq!(replayed.content_type(), Some("image/jpeg"));
        assert_eq!(replayed.fetch_ms, 0);
    }

    #[test]
    fn test_from_cached_rejects_bad_status() {
        let cached = CachedResponse::new(media_url().as_str(), 42, Vec::new(), Bytes::new());
        let result = MediaResponse::from_cached(media_url(), cached);
        assert!(matches!(result, Err(Error::CorruptEntry(_))));
    }

    #[tokio::test]
    async fn test_http_fetcher_new() {
        let fetcher = HttpFetcher::new(FetchConfig::default());
        assert!(fetcher.is_ok());
    }
}
