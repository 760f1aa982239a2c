//! Best-effort notifications to connected client contexts.
//!
//! A context that is not listening when a message is published misses it:
//! there is no queue and no replay. Slow receivers skip what they lagged on.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use uuid::Uuid;

/// Value of the `type` field on every message.
pub const MESSAGE_TYPE: &str = "media-cache";

const CHANNEL_CAPACITY: usize = 64;

/// How an eligible request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Error => "error",
        }
    }
}

/// `{ "type": "media-cache", "status": ..., "url": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCacheMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: CacheStatus,
    pub url: String,
}

impl MediaCacheMessage {
    pub fn new(status: CacheStatus, url: impl Into<String>) -> Self {
        Self { kind: MESSAGE_TYPE.to_string(), status, url: url.into() }
    }
}

type ClientRegistry = Arc<RwLock<HashMap<Uuid, bool>>>;

/// Registry of connected contexts plus the broadcast channel reaching them.
#[derive(Clone, Debug)]
pub struct NotificationHub {
    tx: broadcast::Sender<MediaCacheMessage>,
    clients: ClientRegistry,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx, clients: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Connect a context. It receives every message published from now on,
    /// whether or not it has been claimed yet.
    pub fn connect(&self) -> ClientHandle {
        let id = Uuid::new_v4();
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, false);

        ClientHandle { id, rx: self.tx.subscribe(), clients: self.clients.clone() }
    }

    /// Take control of every connected context. Returns how many were newly claimed.
    pub fn claim(&self) -> usize {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        let mut claimed = 0;
        for controlled in clients.values_mut().filter(|c| !**c) {
            *controlled = true;
            claimed += 1;
        }
        claimed
    }

    pub fn is_controlled(&self, id: Uuid) -> bool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
            .unwrap_or(false)
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Publish to every connected context. Returns how many receivers were
    /// reached; zero listeners is not an error.
    pub fn publish(&self, status: CacheStatus, url: &str) -> usize {
        self.tx.send(MediaCacheMessage::new(status, url)).unwrap_or(0)
    }
}

/// A connected context's end of the notification channel.
///
/// Dropping the handle disconnects the context.
#[derive(Debug)]
pub struct ClientHandle {
    id: Uuid,
    rx: broadcast::Receiver<MediaCacheMessage>,
    clients: ClientRegistry,
}

impl ClientHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the next message. Returns None once the hub is gone.
    pub async fn recv(&mut self) -> Option<MediaCacheMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(client = %self.id, skipped, "media-cache notifications dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next message if one is already waiting.
    pub fn try_recv(&mut self) -> Option<MediaCacheMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_clients() {
        let hub = NotificationHub::new();
        assert_eq!(hub.publish(CacheStatus::Hit, "https://t.example/a"), 0);
    }

    #[tokio::test]
    async fn test_every_client_receives() {
        let hub = NotificationHub::new();
        let mut a = hub.connect();
        let mut b = hub.connect();

        assert_eq!(hub.publish(CacheStatus::Miss, "https://t.example/a"), 2);

        let expected = MediaCacheMessage::new(CacheStatus::Miss, "https://t.example/a");
        assert_eq!(a.recv().await, Some(expected.clone()));
        assert_eq!(b.recv().await, Some(expected));
    }

    #[test]
    fn test_late_client_misses_earlier_messages() {
        let hub = NotificationHub::new();
        let _early = hub.connect();
        hub.publish(CacheStatus::Hit, "https://t.example/a");

        let mut late = hub.connect();
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn test_lagging_client_skips_to_newest() {
        let hub = NotificationHub::new();
        let mut client = hub.connect();
        for i in 0..(CHANNEL_CAPACITY + 10) {
            hub.publish(CacheStatus::Hit, &format!("https://t.example/{i}"));
        }

        let first = client.try_recv().unwrap();
        assert_ne!(first.url, "https://t.example/0");
    }

    #[test]
    fn test_claim_and_disconnect() {
        let hub = NotificationHub::new();
        let a = hub.connect();
        let b = hub.connect();
        assert!(!hub.is_controlled(a.id()));

        assert_eq!(hub.claim(), 2);
        assert!(hub.is_controlled(a.id()));
        assert_eq!(hub.claim(), 0);

        drop(b);
        assert_eq!(hub.client_count(), 1);
    }

    #[test]
    fn test_message_json_shape() {
        let message = MediaCacheMessage::new(CacheStatus::Error, "https://t.example/a?type=full");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "media-cache", "status": "error", "url": "https://t.example/a?type=full"})
        );
    }
}
