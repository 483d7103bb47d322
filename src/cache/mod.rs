//! Category cache.
//!
//! Read-through, write-around caching for category reads:
//!
//! - **Keys**: `categories` for the ordered listing, `category_<id>` per node
//! - **Backend**: opaque string store with per-entry TTL ([`CacheBackend`])
//! - **Coordinator**: typed get/put and plan-driven invalidation
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! capacity = 1024
//! operation_timeout_ms = 250
//! ```

mod backend;
mod config;
mod coordinator;
mod keys;
mod planner;
mod store;

pub use backend::{CacheBackend, CacheError};
pub use config::CacheConfig;
pub use coordinator::CacheCoordinator;
pub use keys::{COLLECTION_KEY, CacheKey};
pub use planner::InvalidationPlan;
pub use store::MemoryCache;

pub(crate) use coordinator::{METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_MISS_TOTAL};
pub(crate) use store::METRIC_CACHE_EVICT_TOTAL;
