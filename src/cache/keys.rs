//! Cache key definitions.
//!
//! Node entries and the full listing share one string namespace so that reads
//! and invalidation always agree on the spelling of a key.

use std::fmt;

use uuid::Uuid;

/// Key of the cached full listing.
pub const COLLECTION_KEY: &str = "categories";
const NODE_PREFIX: &str = "category_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// The full ordered listing.
    Collection,
    /// One category snapshot.
    Node(Uuid),
}

impl CacheKey {
    /// Metric label for the key family.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::Collection => "collection",
            CacheKey::Node(_) => "node",
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Collection => f.write_str(COLLECTION_KEY),
            CacheKey::Node(id) => write!(f, "{NODE_PREFIX}{id}"),
        }
    }
}
