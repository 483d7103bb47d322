//! Read-through category cache.
//!
//! Typed access over a [`CacheBackend`]: JSON snapshots of single records and
//! of the full listing, bounded backend calls, and plan-driven invalidation.
//! Errors are returned to the caller, which decides whether they matter.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::categories::CategoryRecord;

use super::backend::{CacheBackend, CacheError};
use super::config::CacheConfig;
use super::keys::CacheKey;
use super::planner::InvalidationPlan;

pub(crate) const METRIC_CACHE_HIT_TOTAL: &str = "arbor_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS_TOTAL: &str = "arbor_cache_miss_total";

#[derive(Clone)]
pub struct CacheCoordinator {
    backend: Option<Arc<dyn CacheBackend>>,
    config: CacheConfig,
}

impl CacheCoordinator {
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        let backend = config.enabled.then_some(backend);
        Self { backend, config }
    }

    /// A coordinator that never caches anything.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            config: CacheConfig {
                enabled: false,
                ..Default::default()
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Lifetime applied to entries written by reads.
    pub fn ttl(&self) -> Duration {
        self.config.ttl()
    }

    pub async fn get_node(&self, id: Uuid) -> Result<Option<CategoryRecord>, CacheError> {
        self.read(CacheKey::Node(id)).await
    }

    pub async fn get_collection(&self) -> Result<Option<Vec<CategoryRecord>>, CacheError> {
        self.read(CacheKey::Collection).await
    }

    pub async fn put_node(
        &self,
        id: Uuid,
        record: &CategoryRecord,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.write(CacheKey::Node(id), record, ttl).await
    }

    pub async fn put_collection(
        &self,
        records: &[CategoryRecord],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.write(CacheKey::Collection, records, ttl).await
    }

    /// Deletes every key in `plan` in one backend call.
    pub async fn invalidate(&self, plan: &InvalidationPlan) -> Result<(), CacheError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(());
        };
        let keys = plan.rendered();
        self.bounded("delete", backend.delete(&keys)).await?;
        debug!(keys = keys.len(), plan = %plan, "Cache keys invalidated");
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>, CacheError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(None);
        };
        let rendered = key.render();
        let raw = self.bounded("get", backend.get(&rendered)).await?;

        let Some(raw) = raw else {
            counter!(METRIC_CACHE_MISS_TOTAL, "kind" => key.kind()).increment(1);
            debug!(key = %rendered, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT_TOTAL, "kind" => key.kind()).increment(1);
                debug!(key = %rendered, "Cache hit");
                Ok(Some(value))
            }
            Err(err) => {
                counter!(METRIC_CACHE_MISS_TOTAL, "kind" => key.kind()).increment(1);
                warn!(key = %rendered, error = %err, "Discarding undecodable cache entry");
                let evict = [rendered];
                if let Err(evict_err) = self.bounded("delete", backend.delete(&evict)).await {
                    warn!(
                        key = %evict[0],
                        error = %evict_err,
                        "Failed to evict undecodable cache entry"
                    );
                }
                Ok(None)
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: CacheKey,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(());
        };
        let payload = serde_json::to_string(value)?;
        let rendered = key.render();
        self.bounded("set", backend.set(&rendered, payload, ttl)).await
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        match tokio::time::timeout(self.config.operation_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                op,
                timeout_ms: self.config.operation_timeout_ms,
            }),
        }
    }
}
