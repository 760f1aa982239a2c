//! Process-local blob handles.
//!
//! A handle wraps an in-memory body so application code can address cached
//! media without re-reading the store. Handles hold their bytes until the
//! owner revokes them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use uuid::Uuid;

/// Scheme and authority of every handle this registry issues.
pub const BLOB_URL_PREFIX: &str = "blob:thisday/";

/// A dereferenceable handle, e.g. `blob:thisday/3f0c...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An in-memory binary body with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Live blob handles for this process.
#[derive(Clone, Debug, Default)]
pub struct BlobRegistry {
    blobs: Arc<RwLock<HashMap<String, Blob>>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` and return a fresh handle to it.
    pub fn create(&self, blob: Blob) -> BlobUrl {
        let url = format!("{BLOB_URL_PREFIX}{}", Uuid::new_v4());
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), blob);
        BlobUrl(url)
    }

    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Release a handle. Returns false if it was unknown or already released.
    pub fn revoke(&self, url: &str) -> bool {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
