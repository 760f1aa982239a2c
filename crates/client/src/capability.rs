//! Detection of the persistent cache capability.

use std::sync::Arc;

use reqwest::Url;
use thisday_core::{AppConfig, CacheDb, CachePolicy, MediaCache};

use crate::direct::{MediaCacheAccess, PersistentMediaCache, UnavailableMediaCache};
use crate::fetch::Fetcher;
use crate::intercept::Interceptor;
use crate::notify::NotificationHub;
use crate::route::MediaRoute;

/// Whether a persistent response cache is present in this context.
#[derive(Debug, Clone)]
pub enum Capability {
    Persistent(Arc<MediaCache>),
    Absent,
}

impl Capability {
    /// Open the configured store. Any failure degrades to [`Capability::Absent`].
    pub async fn probe(config: &AppConfig) -> Self {
        if !config.cache_enabled {
            tracing::info!("media cache disabled by configuration");
            return Self::Absent;
        }

        match CacheDb::open(&config.db_path).await {
            Ok(db) => Self::Persistent(Arc::new(MediaCache::new(Arc::new(db), CachePolicy::default()))),
            Err(e) => {
                tracing::warn!(path = %config.db_path.display(), error = %e, "media cache unavailable");
                Self::Absent
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }

    pub fn media_cache(&self) -> Option<&Arc<MediaCache>> {
        match self {
            Self::Persistent(cache) => Some(cache),
            Self::Absent => None,
        }
    }

    /// The direct-access API, a no-op stand-in when the cache is absent.
    pub fn direct_access(
        &self, fetcher: Arc<dyn Fetcher>, route: MediaRoute, origin: Option<Url>,
    ) -> Arc<dyn MediaCacheAccess> {
        match self {
            Self::Persistent(cache) => Arc::new(PersistentMediaCache::new(cache.clone(), fetcher, route, origin)),
            Self::Absent => Arc::new(UnavailableMediaCache),
        }
    }

    /// An interceptor over the cache. Never installed without one.
    pub fn interceptor(
        &self, fetcher: Arc<dyn Fetcher>, route: MediaRoute, hub: NotificationHub,
    ) -> Option<Interceptor> {
        self.media_cache().map(|cache| Interceptor::new(cache.clone(), fetcher, route, hub))
    }
}
