//! SQLite-backed store for full-resolution media responses.
//!
//! Responses are keyed by exact request URL and namespaced by generation
//! name (`<prefix><version>`). It supports:
//!
//! - Insertion-ordered enumeration for FIFO trimming
//! - Bulk deletion of superseded generations on activation
//! - Automatic schema migrations
//! - WAL mode for concurrent access from several contexts

pub mod connection;
pub mod entries;
pub mod hash;
pub mod manager;
pub mod migrations;
pub mod policy;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedResponse;
pub use manager::MediaCache;
pub use policy::{CACHE_PREFIX, CACHE_VERSION, CachePolicy, MAX_ENTRIES};
pub use storage::{Cache, CacheStorage};
