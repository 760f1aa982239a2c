//! Interception layer: cache-first, network-fallback for eligible requests.
//!
//! ### Lifecycle
//! - `Installing -> Waiting -> Active`. Install never waits for older
//!   contexts to close; it proceeds straight to activation.
//! - Activation deletes every superseded generation and claims all
//!   connected contexts.
//! - Only an active interceptor intercepts. Everything else passes through.
//!
//! ### Request protocol
//! - Ineligible request: passthrough, untouched.
//! - Hit: replay the stored response, publish `hit`.
//! - Miss: fetch; an ok response is stored by a detached task (the caller
//!   does not wait for the write or the trim) and `miss` is published.
//!   A failed or non-ok fetch is returned as-is and `error` is published.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use thisday_core::{Cache, CachedResponse, Error, MediaCache};

use crate::fetch::{FetchOptions, Fetcher, MediaRequest, MediaResponse};
use crate::notify::{CacheStatus, NotificationHub};
use crate::route::MediaRoute;

/// Lifecycle state of the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Waiting,
    Active,
}

/// Outcome of offering a request to the interceptor.
#[derive(Debug)]
pub enum Interception {
    /// Not intercepted; the request should go to the network unmodified.
    Passthrough,
    /// Intercepted and answered.
    Responded { status: CacheStatus, result: Result<MediaResponse, Error> },
}

/// Request-intercepting proxy over the shared media cache.
pub struct Interceptor {
    cache: Arc<MediaCache>,
    fetcher: Arc<dyn Fetcher>,
    route: MediaRoute,
    hub: NotificationHub,
    state: Mutex<WorkerState>,
    population: Mutex<Vec<JoinHandle<()>>>,
}

impl Interceptor {
    pub fn new(cache: Arc<MediaCache>, fetcher: Arc<dyn Fetcher>, route: MediaRoute, hub: NotificationHub) -> Self {
        Self {
            cache,
            fetcher,
            route,
            hub,
            state: Mutex::new(WorkerState::Installing),
            population: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: WorkerState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(from = ?*state, to = ?next, "media cache interceptor state change");
        *state = next;
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    pub fn route(&self) -> &MediaRoute {
        &self.route
    }

    /// Install and immediately activate.
    ///
    /// Returns the names of the generations deleted during activation.
    pub async fn install(&self) -> Result<Vec<String>, Error> {
        if self.state() == WorkerState::Installing {
            self.set_state(WorkerState::Waiting);
        }
        self.activate().await
    }

    /// Delete superseded generations and take control of every context.
    ///
    /// On failure the interceptor stays inactive and keeps passing requests
    /// through.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        let deleted = self.cache.activate().await?;
        let claimed = self.hub.claim();
        self.set_state(WorkerState::Active);
        tracing::info!(
            generation = %self.cache.policy().generation_name(),
            deleted = deleted.len(),
            claimed,
            "media cache interceptor active"
        );
        Ok(deleted)
    }

    /// Offer a request to the interceptor.
    pub async fn handle_fetch(&self, request: &MediaRequest) -> Interception {
        if self.state() != WorkerState::Active || !self.route.is_eligible(request) {
            return Interception::Passthrough;
        }

        let cache = self.cache.open();
        let url = request.url.as_str();

        match cache.lookup(url).await {
            Ok(Some(cached)) => match MediaResponse::from_cached(request.url.clone(), cached) {
                Ok(response) => {
                    tracing::debug!(url, "media cache hit");
                    self.hub.publish(CacheStatus::Hit, url);
                    return Interception::Responded { status: CacheStatus::Hit, result: Ok(response) };
                }
                Err(e) => tracing::warn!(url, error = %e, "unreadable cache entry, refetching"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(url, error = %e, "cache lookup failed, falling back to network"),
        }

        let result = self.fetcher.fetch(request, FetchOptions::default()).await;
        let status = match &result {
            Ok(response) if response.is_ok() => {
                self.populate(cache, response.to_cached());
                CacheStatus::Miss
            }
            Ok(response) => {
                tracing::debug!(url, status = response.status.as_u16(), "media fetch not ok, not caching");
                CacheStatus::Error
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "media fetch failed");
                CacheStatus::Error
            }
        };

        self.hub.publish(status, url);
        Interception::Responded { status, result }
    }

    /// Fetch through the interceptor, going to the network directly for
    /// requests it does not intercept.
    pub async fn fetch(&self, request: &MediaRequest) -> Result<MediaResponse, Error> {
        match self.handle_fetch(request).await {
            Interception::Passthrough => self.fetcher.fetch(request, FetchOptions::default()).await,
            Interception::Responded { result, .. } => result,
        }
    }

    /// Store an entry and trim in the background. Failures are logged and dropped.
    fn populate(&self, cache: Cache, entry: CachedResponse) {
        let media = self.cache.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = cache.put(&entry).await {
                tracing::warn!(url = %entry.url, error = %e, "failed to store media response");
                return;
            }
            media.trim(&cache).await;
        });

        let mut pending = self.population.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    /// Wait for every outstanding background store to finish.
    pub async fn settle(&self) {
        let pending = std::mem::take(&mut *self.population.lock().unwrap_or_else(PoisonError::into_inner));
        for task in pending {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "media cache population task failed");
            }
        }
    }
}
