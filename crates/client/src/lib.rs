//! Client side of the thisday media cache.
//!
//! This crate provides the network fetch path, request eligibility, the
//! intercepting proxy, the direct-access API, and the notification channel
//! to connected clients.

pub mod blob;
pub mod capability;
pub mod direct;
pub mod fetch;
pub mod intercept;
pub mod notify;
pub mod route;

#[cfg(test)]
pub(crate) mod test_utils;

pub use blob::{BLOB_URL_PREFIX, Blob, BlobRegistry, BlobUrl};
pub use capability::Capability;
pub use direct::{MediaCacheAccess, PersistentMediaCache, UnavailableMediaCache};
pub use fetch::{FetchConfig, FetchOptions, Fetcher, HttpFetcher, MediaRequest, MediaResponse};
pub use intercept::{Interception, Interceptor, WorkerState};
pub use notify::{CacheStatus, ClientHandle, MediaCacheMessage, NotificationHub};
pub use route::MediaRoute;

pub use reqwest::{Method, StatusCode, Url, header};
