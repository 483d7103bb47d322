//! In-memory repository implementation.
//!
//! An arena of records keyed by id plus the creation order and a name index.
//! Used when no database is configured and as the default test backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, RepoError, UpdateCategoryParams,
};
use crate::domain::categories::CategoryRecord;
use crate::domain::hierarchy::ParentLink;
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "infra::memory";
const NAME_CONSTRAINT: &str = "categories_name_key";

#[derive(Default)]
struct State {
    records: HashMap<Uuid, CategoryRecord>,
    order: Vec<Uuid>,
    names: HashMap<String, Uuid>,
}

impl State {
    fn ordered(&self) -> impl Iterator<Item = &CategoryRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    fn name_taken(&self, name: &str, owner: Option<Uuid>) -> bool {
        self.names
            .get(name)
            .is_some_and(|holder| Some(*holder) != owner)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCategories {
    state: Arc<RwLock<State>>,
}

impl InMemoryCategories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.state, SOURCE, "len").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn duplicate() -> RepoError {
    RepoError::Duplicate {
        constraint: NAME_CONSTRAINT.to_string(),
    }
}

#[async_trait]
impl CategoriesRepo for InMemoryCategories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(rw_read(&self.state, SOURCE, "find_by_id")
            .records
            .get(&id)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, RepoError> {
        let state = rw_read(&self.state, SOURCE, "find_by_name");
        Ok(state
            .names
            .get(name)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(rw_read(&self.state, SOURCE, "list_all")
            .ordered()
            .cloned()
            .collect())
    }

    async fn list_parent_links(&self) -> Result<Vec<ParentLink>, RepoError> {
        Ok(rw_read(&self.state, SOURCE, "list_parent_links")
            .ordered()
            .map(|record| ParentLink {
                id: record.id,
                parent_id: record.parent_id,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
impl CategoriesWriteRepo for InMemoryCategories {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut state = rw_write(&self.state, SOURCE, "create_category");
        if state.name_taken(&params.name, None) {
            return Err(duplicate());
        }

        let now = OffsetDateTime::now_utc();
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            name: params.name,
            parent_id: params.parent_id,
            level: params.level,
            is_active: true,
            children: None,
            created_at: now,
            updated_at: now,
        };

        state.names.insert(record.name.clone(), record.id);
        state.order.push(record.id);
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut state = rw_write(&self.state, SOURCE, "update_category");
        let Some(previous_name) = state.records.get(&params.id).map(|r| r.name.clone()) else {
            return Err(RepoError::NotFound);
        };
        if state.name_taken(&params.name, Some(params.id)) {
            return Err(duplicate());
        }

        let now = OffsetDateTime::now_utc();
        if params.level_delta != 0 {
            for id in &params.descendants {
                if let Some(descendant) = state.records.get_mut(id) {
                    descendant.level = descendant.level.saturating_add(params.level_delta);
                    descendant.updated_at = now;
                }
            }
        }

        state.names.remove(&previous_name);
        state.names.insert(params.name.clone(), params.id);

        let record = state
            .records
            .get_mut(&params.id)
            .ok_or(RepoError::NotFound)?;
        record.name = params.name;
        record.parent_id = params.parent_id;
        record.level = params.level;
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn set_active_bulk(&self, ids: &[Uuid], is_active: bool) -> Result<u64, RepoError> {
        let mut state = rw_write(&self.state, SOURCE, "set_active_bulk");
        let now = OffsetDateTime::now_utc();
        let unique: HashSet<&Uuid> = ids.iter().collect();

        let mut matched = 0;
        for id in unique {
            if let Some(record) = state.records.get_mut(id) {
                record.is_active = is_active;
                record.updated_at = now;
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = rw_write(&self.state, SOURCE, "delete_category");
        let Some(record) = state.records.remove(&id) else {
            return Ok(false);
        };
        state.names.remove(&record.name);
        state.order.retain(|candidate| *candidate != id);
        Ok(true)
    }
}
