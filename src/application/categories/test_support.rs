use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, RepoError, UpdateCategoryParams,
};
use crate::cache::{CacheBackend, CacheConfig, CacheError, MemoryCache};
use crate::domain::categories::CategoryRecord;
use crate::domain::hierarchy::ParentLink;
use crate::infra::memory::InMemoryCategories;

/// Delegates to the in-memory repo but reports one row fewer on bulk writes.
pub(crate) struct ShortCountingWriter {
    pub(crate) inner: InMemoryCategories,
}

#[async_trait]
impl CategoriesWriteRepo for ShortCountingWriter {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        self.inner.create_category(params).await
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        self.inner.update_category(params).await
    }

    async fn set_active_bulk(&self, ids: &[Uuid], is_active: bool) -> Result<u64, RepoError> {
        let matched = self.inner.set_active_bulk(ids, is_active).await?;
        Ok(matched.saturating_sub(1))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        self.inner.delete_category(id).await
    }
}

/// What the store held for a node at the moment its key was invalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidationSnapshot {
    pub(crate) key: String,
    pub(crate) is_active: Option<bool>,
}

/// Memory backend that records deletes together with the store state seen at that time.
pub(crate) struct RecordingBackend {
    inner: MemoryCache,
    repo: Arc<InMemoryCategories>,
    deletes: Mutex<Vec<Vec<InvalidationSnapshot>>>,
}

impl RecordingBackend {
    pub(crate) fn new(repo: Arc<InMemoryCategories>) -> Self {
        Self {
            inner: MemoryCache::new(&CacheConfig::default()),
            repo,
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn deletes(&self) -> Vec<Vec<InvalidationSnapshot>> {
        self.deletes.lock().unwrap().clone()
    }

    pub(crate) fn last_delete_keys(&self) -> Vec<String> {
        self.deletes()
            .last()
            .map(|batch| batch.iter().map(|snap| snap.key.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) async fn holds(&self, key: &str) -> bool {
        self.inner.get(key).await.unwrap().is_some()
    }
}

#[async_trait]
impl CacheBackend for RecordingBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut batch = Vec::with_capacity(keys.len());
        for key in keys {
            let is_active = match key.strip_prefix("category_").map(Uuid::parse_str) {
                Some(Ok(id)) => self
                    .repo
                    .find_by_id(id)
                    .await
                    .unwrap()
                    .map(|record| record.is_active),
                _ => None,
            };
            batch.push(InvalidationSnapshot {
                key: key.clone(),
                is_active,
            });
        }
        self.deletes.lock().unwrap().push(batch);
        self.inner.delete(keys).await
    }
}

/// Backend whose every call fails.
pub(crate) struct FailingBackend;

#[async_trait]
impl CacheBackend for FailingBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn delete(&self, _keys: &[String]) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }
}

/// In-memory repo whose point lookups start timing out once a bulk activation write commits.
#[derive(Default)]
pub(crate) struct LookupOutageAfterBulkWrite {
    pub(crate) inner: InMemoryCategories,
    outage: AtomicBool,
}

#[async_trait]
impl CategoriesRepo for LookupOutageAfterBulkWrite {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        self.inner.find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, RepoError> {
        self.inner.find_by_name(name).await
    }

    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        self.inner.list_all().await
    }

    async fn list_parent_links(&self) -> Result<Vec<ParentLink>, RepoError> {
        self.inner.list_parent_links().await
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl CategoriesWriteRepo for LookupOutageAfterBulkWrite {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        self.inner.create_category(params).await
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        self.inner.update_category(params).await
    }

    async fn set_active_bulk(&self, ids: &[Uuid], is_active: bool) -> Result<u64, RepoError> {
        let matched = self.inner.set_active_bulk(ids, is_active).await?;
        self.outage.store(true, Ordering::SeqCst);
        Ok(matched)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        self.inner.delete_category(id).await
    }
}
