//! Storage backend seam and the per-generation cache handle.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::connection::CacheDb;
use super::entries::CachedResponse;
use crate::Error;

/// Durable keyed storage of responses, namespaced by generation name.
///
/// Individual puts and deletes must be atomic; nothing else is assumed.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Look up the response stored under `url`.
    async fn lookup(&self, generation: &str, url: &str) -> Result<Option<CachedResponse>, Error>;

    /// Store a response under its URL, replacing any existing entry.
    async fn put(&self, generation: &str, response: &CachedResponse) -> Result<(), Error>;

    /// Stored URLs, oldest insertion first.
    async fn keys(&self, generation: &str) -> Result<Vec<String>, Error>;

    /// Remove one entry. Removing a missing entry is not an error.
    async fn delete(&self, generation: &str, url: &str) -> Result<bool, Error>;

    /// Every generation name present.
    async fn names(&self) -> Result<Vec<String>, Error>;

    /// Remove a whole generation.
    async fn delete_generation(&self, generation: &str) -> Result<bool, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn lookup(&self, generation: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        self.match_entry(generation, url).await
    }

    async fn put(&self, generation: &str, response: &CachedResponse) -> Result<(), Error> {
        self.put_entry(generation, response).await
    }

    async fn keys(&self, generation: &str) -> Result<Vec<String>, Error> {
        self.entry_keys(generation).await
    }

    async fn delete(&self, generation: &str, url: &str) -> Result<bool, Error> {
        self.delete_entry(generation, url).await
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        self.generation_names().await
    }

    async fn delete_generation(&self, generation: &str) -> Result<bool, Error> {
        CacheDb::delete_generation(self, generation).await
    }
}

/// Handle to one generation of the store.
///
/// Opening a handle performs no I/O; the generation is created by its
/// first `put`.
#[derive(Clone)]
pub struct Cache {
    storage: Arc<dyn CacheStorage>,
    name: String,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Cache {
    pub fn open(storage: Arc<dyn CacheStorage>, name: impl Into<String>) -> Self {
        Self { storage, name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find the stored response for `url`, ignoring request header variance.
    pub async fn lookup(&self, url: &str) -> Result<Option<CachedResponse>, Error> {
        self.storage.lookup(&self.name, url).await
    }

    pub async fn put(&self, response: &CachedResponse) -> Result<(), Error> {
        self.storage.put(&self.name, response).await
    }

    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.storage.keys(&self.name).await
    }

    pub async fn delete(&self, url: &str) -> Result<bool, Error> {
        self.storage.delete(&self.name, url).await
    }
}
