use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::repos::{CategoriesRepo, CategoriesWriteRepo};
use crate::cache::{CacheCoordinator, InvalidationPlan};
use crate::domain::categories::CategoryRecord;

use super::cascade::{CascadeEngine, CascadeOutcome, CascadePolicy};
use super::error::CategoryError;
use super::store::CategoryStore;
use super::types::{CategoryPatch, CreateCategoryCommand};

/// Entry point for every category operation.
///
/// Mutations commit to the store before any cache key is dropped. Reads try the
/// cache first and write back on a miss. Cache failures are logged and never
/// change the outcome of an operation.
#[derive(Clone)]
pub struct CategoryService {
    store: CategoryStore,
    cascade: CascadeEngine,
    cache: CacheCoordinator,
}

impl CategoryService {
    pub fn new(
        reader: Arc<dyn CategoriesRepo>,
        writer: Arc<dyn CategoriesWriteRepo>,
        cache: CacheCoordinator,
        policy: CascadePolicy,
    ) -> Self {
        let store = CategoryStore::new(reader, writer);
        let cascade = CascadeEngine::new(store.clone(), policy);
        Self {
            store,
            cascade,
            cache,
        }
    }

    #[instrument(skip(self, command), fields(name = %command.name))]
    pub async fn create_category(
        &self,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, CategoryError> {
        let record = self.store.create(command).await?;
        self.invalidate([record.id]).await;

        info!(
            category = %record.id,
            level = record.level,
            parent = ?record.parent_id,
            "Category created"
        );
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CategoryError> {
        match self.cache.get_collection().await {
            Ok(Some(records)) => return Ok(records),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Category listing cache read failed"),
        }

        let records = self.store.list_all(true).await?;
        if let Err(err) = self.cache.put_collection(&records, self.cache.ttl()).await {
            warn!(error = %err, "Category listing cache write failed");
        }
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> Result<CategoryRecord, CategoryError> {
        match self.cache.get_node(id).await {
            Ok(Some(record)) => return Ok(record),
            Ok(None) => {}
            Err(err) => warn!(category = %id, error = %err, "Category cache read failed"),
        }

        let record = self.store.get(id).await?;
        if let Err(err) = self.cache.put_node(id, &record, self.cache.ttl()).await {
            warn!(category = %id, error = %err, "Category cache write failed");
        }
        Ok(record)
    }

    /// Applies name and parent changes, then cascades a requested activation change.
    #[instrument(skip(self, patch))]
    pub async fn update_category(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> Result<CategoryRecord, CategoryError> {
        if patch.is_empty() {
            return Err(CategoryError::validation(
                "update requires at least one of name, parentId or isActive",
            ));
        }

        let requested_active = patch.is_active;
        let fields = CategoryPatch {
            is_active: None,
            ..patch
        };
        let update = self.store.update(id, fields).await?;
        let mut touched: BTreeSet<Uuid> = update.touched().into_iter().collect();

        let cascade = match requested_active {
            Some(is_active) => self.cascade.cascade_active_state(id, is_active).await,
            None => Ok(CascadeOutcome::default()),
        };

        let outcome = match cascade {
            Ok(outcome) => outcome,
            Err(err) => {
                if let CategoryError::PartialCascade { attempted, .. } = &err {
                    touched.extend(attempted.iter().copied());
                }
                if !touched.is_empty() {
                    self.invalidate(touched).await;
                }
                return Err(err);
            }
        };

        let cascaded = !outcome.is_empty();
        touched.extend(outcome.into_affected());
        if touched.is_empty() {
            return Ok(update.record);
        }

        let affected = touched.len();
        self.invalidate(touched).await;

        let record = if cascaded {
            self.reread_after_cascade(update.record, requested_active).await
        } else {
            update.record
        };

        info!(
            category = %id,
            affected,
            is_active = record.is_active,
            "Category updated"
        );
        Ok(record)
    }

    /// Removes one category. Its children keep their dangling parent reference.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<(), CategoryError> {
        self.store.delete(id).await?;
        self.invalidate([id]).await;

        info!(category = %id, "Category deleted");
        Ok(())
    }

    /// Ancestors from the root down to the direct parent. Never cached.
    #[instrument(skip(self))]
    pub async fn category_lineage(&self, id: Uuid) -> Result<Vec<CategoryRecord>, CategoryError> {
        self.store.lineage(id).await
    }

    pub async fn health_check(&self) -> Result<(), CategoryError> {
        self.store.health_check().await
    }

    /// The cascade already committed, so a failed re-read falls back to the
    /// store update's record with the requested activation applied.
    async fn reread_after_cascade(
        &self,
        mut last_known: CategoryRecord,
        requested_active: Option<bool>,
    ) -> CategoryRecord {
        match self.store.get(last_known.id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    category = %last_known.id,
                    error = %err,
                    "Re-read after cascade failed; returning last known record"
                );
                if let Some(is_active) = requested_active {
                    last_known.is_active = is_active;
                }
                last_known
            }
        }
    }

    async fn invalidate(&self, affected: impl IntoIterator<Item = Uuid>) {
        let plan = InvalidationPlan::for_mutation(affected);
        if let Err(err) = self.cache.invalidate(&plan).await {
            warn!(
                plan = %plan,
                error = %err,
                "Cache invalidation failed; entries expire with their TTL"
            );
        }
    }
}
