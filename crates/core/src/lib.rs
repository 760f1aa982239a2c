//! Core types and shared functionality for the thisday media cache.
//!
//! This crate provides:
//! - Generation-namespaced response store with a SQLite backend
//! - Cache policy, activation and occupancy trimming
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheDb, CachePolicy, CacheStorage, CachedResponse, MediaCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
