//! Generation naming and occupancy budget.

/// Prefix shared by every generation this application owns.
pub const CACHE_PREFIX: &str = "thisday-";

/// Active generation version. Bumping it discards every cached body on the
/// next activation.
pub const CACHE_VERSION: &str = "full-media-v2";

/// Maximum number of entries kept in the active generation.
pub const MAX_ENTRIES: usize = 60;

/// Naming and budget for the cache generations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    pub prefix: String,
    pub version: String,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { prefix: CACHE_PREFIX.to_string(), version: CACHE_VERSION.to_string(), max_entries: MAX_ENTRIES }
    }
}

impl CachePolicy {
    /// Name of the active generation: `<prefix><version>`.
    pub fn generation_name(&self) -> String {
        format!("{}{}", self.prefix, self.version)
    }

    /// Whether `name` belongs to this application but is not the active generation.
    pub fn is_stale(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && name != self.generation_name()
    }
}
