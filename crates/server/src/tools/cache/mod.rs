//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and pruning the active
//! generation of the media cache.

pub mod clear;
pub mod keys;
pub mod purge;

pub use clear::{CacheClearParams, clear_impl};
pub use keys::{CacheKeysParams, keys_impl};
pub use purge::{CachePurgeParams, purge_impl};
