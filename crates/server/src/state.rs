//! Shared state behind every tool call.

use std::sync::Arc;

use thisday_client::{
    Capability, Fetcher, Interceptor, MediaCacheAccess, MediaRoute, NotificationHub, Url,
};

/// Everything a tool needs: the cache capability and both access paths.
pub struct AppState {
    pub capability: Capability,
    pub fetcher: Arc<dyn Fetcher>,
    pub access: Arc<dyn MediaCacheAccess>,
    pub interceptor: Option<Interceptor>,
    pub hub: NotificationHub,
    pub origin: Option<Url>,
}

impl AppState {
    /// Wire up the access paths. The interceptor exists only when the cache
    /// is present and interception is enabled; it still has to be installed.
    pub fn new(capability: Capability, fetcher: Arc<dyn Fetcher>, origin: Option<Url>, intercept: bool) -> Self {
        let hub = NotificationHub::new();
        let access = capability.direct_access(fetcher.clone(), MediaRoute::default(), origin.clone());
        let interceptor = if intercept {
            capability.interceptor(fetcher.clone(), MediaRoute::default(), hub.clone())
        } else {
            None
        };

        Self { capability, fetcher, access, interceptor, hub, origin }
    }
}
