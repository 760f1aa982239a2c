//! Cache manager: active generation, activation and trimming.
//!
//! One `MediaCache` is constructed at startup and shared by the
//! interception layer and the direct-access API.

use std::fmt;
use std::sync::Arc;

use super::policy::CachePolicy;
use super::storage::{Cache, CacheStorage};
use crate::Error;

/// Shared media cache state: a storage backend plus the generation policy.
#[derive(Clone)]
pub struct MediaCache {
    storage: Arc<dyn CacheStorage>,
    policy: CachePolicy,
}

impl fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCache").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl MediaCache {
    pub fn new(storage: Arc<dyn CacheStorage>, policy: CachePolicy) -> Self {
        Self { storage, policy }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Handle to the active generation.
    pub fn open(&self) -> Cache {
        Cache::open(self.storage.clone(), self.policy.generation_name())
    }

    /// Handle to an arbitrary generation, active or not.
    pub fn open_generation(&self, name: &str) -> Cache {
        Cache::open(self.storage.clone(), name)
    }

    /// Delete every generation sharing the prefix except the active one.
    ///
    /// Returns the names of the deleted generations. Generations outside the
    /// prefix belong to someone else and are left alone.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        let names = self.storage.names().await?;
        let mut deleted = Vec::new();

        for name in names.into_iter().filter(|name| self.policy.is_stale(name)) {
            if self.storage.delete_generation(&name).await? {
                tracing::info!(generation = %name, "deleted superseded cache generation");
                deleted.push(name);
            }
        }

        Ok(deleted)
    }

    /// Delete every generation sharing the prefix, the active one included.
    ///
    /// Returns the names of the deleted generations. The active generation is
    /// recreated lazily by the next write.
    pub async fn clear_all(&self) -> Result<Vec<String>, Error> {
        let names = self.storage.names().await?;
        let mut cleared = Vec::new();

        for name in names.into_iter().filter(|name| name.starts_with(&self.policy.prefix)) {
            if self.storage.delete_generation(&name).await? {
                cleared.push(name);
            }
        }

        tracing::info!(cleared = cleared.len(), "cleared media caches");
        Ok(cleared)
    }

    /// Trim `cache` to the policy budget. See [`MediaCache::trim_to`].
    pub async fn trim(&self, cache: &Cache) -> usize {
        self.trim_to(cache, self.policy.max_entries).await
    }

    /// Delete the oldest-inserted entries until at most `max_entries` remain.
    ///
    /// Best-effort: enumeration or deletion errors stop the trim and leave the
    /// store over budget. Returns the number of entries removed.
    pub async fn trim_to(&self, cache: &Cache, max_entries: usize) -> usize {
        let keys = match cache.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::debug!(generation = cache.name(), error = %e, "trim skipped: enumeration failed");
                return 0;
            }
        };

        if keys.len() <= max_entries {
            return 0;
        }

        let excess = keys.len() - max_entries;
        let mut removed = 0;
        for key in keys.iter().take(excess) {
            match cache.delete(key).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(generation = cache.name(), url = %key, error = %e, "trim stopped: delete failed");
                    break;
                }
            }
        }

        tracing::debug!(generation = cache.name(), removed, budget = max_entries, "trimmed media cache");
        removed
    }
}
