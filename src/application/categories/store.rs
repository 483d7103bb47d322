use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, UpdateCategoryParams,
};
use crate::domain::categories::{
    CategoryRecord, ROOT_LEVEL, ensure_subtree_fits, level_under, normalize_name,
};
use crate::domain::error::DomainError;
use crate::domain::hierarchy::{ChildIndex, ParentLink};

use super::error::CategoryError;
use super::hierarchy::HierarchyTraversal;
use super::types::{CategoryPatch, CreateCategoryCommand, StoreUpdate};

/// Persisted categories with the per-node rules enforced on every write.
#[derive(Clone)]
pub struct CategoryStore {
    reader: Arc<dyn CategoriesRepo>,
    writer: Arc<dyn CategoriesWriteRepo>,
    traversal: HierarchyTraversal,
}

struct Placement {
    parent_id: Option<Uuid>,
    level: i16,
    descendants: Vec<Uuid>,
}

impl CategoryStore {
    pub fn new(reader: Arc<dyn CategoriesRepo>, writer: Arc<dyn CategoriesWriteRepo>) -> Self {
        let traversal = HierarchyTraversal::new(reader.clone());
        Self {
            reader,
            writer,
            traversal,
        }
    }

    pub fn traversal(&self) -> &HierarchyTraversal {
        &self.traversal
    }

    pub async fn create(
        &self,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, CategoryError> {
        let name = normalize_name(&command.name)?;

        let level = match command.parent_id {
            Some(parent_id) => {
                let parent = self
                    .reader
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| CategoryError::parent_not_found(parent_id))?;
                level_under(Some(parent.level))?
            }
            None => ROOT_LEVEL,
        };

        self.ensure_name_available(&name, None).await?;

        self.writer
            .create_category(CreateCategoryParams {
                name,
                parent_id: command.parent_id,
                level,
            })
            .await
            .map_err(CategoryError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryRecord, CategoryError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or_else(|| CategoryError::not_found(id))
    }

    /// Every record in creation order, optionally with direct children derived from parent links.
    pub async fn list_all(
        &self,
        populate_children: bool,
    ) -> Result<Vec<CategoryRecord>, CategoryError> {
        let mut records = self.reader.list_all().await?;
        if !populate_children {
            return Ok(records);
        }

        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for record in &records {
            if let Some(parent_id) = record.parent_id {
                children.entry(parent_id).or_default().push(record.id);
            }
        }
        for record in &mut records {
            record.children = Some(children.remove(&record.id).unwrap_or_default());
        }
        Ok(records)
    }

    /// Applies name and parent changes; a requested `is_active` is written to this node alone.
    pub async fn update(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> Result<StoreUpdate, CategoryError> {
        let existing = self.get(id).await?;

        let name = match patch.name.as_deref() {
            Some(raw) => normalize_name(raw)?,
            None => existing.name.clone(),
        };
        let renamed = name != existing.name;
        if renamed {
            self.ensure_name_available(&name, Some(id)).await?;
        }

        let placement = match patch.parent_id {
            Some(parent_id) if parent_id != existing.parent_id => {
                Some(self.place(&existing, parent_id).await?)
            }
            _ => None,
        };

        let mut record = existing.clone();
        let mut relevelled = Vec::new();
        let mut changed = false;

        if renamed || placement.is_some() {
            let (parent_id, level, descendants) = match placement {
                Some(placement) => (placement.parent_id, placement.level, placement.descendants),
                None => (existing.parent_id, existing.level, Vec::new()),
            };
            let level_delta = level - existing.level;
            let descendants = if level_delta == 0 {
                Vec::new()
            } else {
                descendants
            };

            record = self
                .writer
                .update_category(UpdateCategoryParams {
                    id,
                    name,
                    parent_id,
                    level,
                    descendants: descendants.clone(),
                    level_delta,
                })
                .await
                .map_err(|err| CategoryError::from_repo_for(id, err))?;
            relevelled = descendants;
            changed = true;
        }

        if let Some(is_active) = patch.is_active {
            if is_active != record.is_active {
                let updated = self.bulk_set_active(&[id], is_active).await?;
                if updated == 0 {
                    return Err(CategoryError::not_found(id));
                }
                record = self.get(id).await?;
                changed = true;
            }
        }

        Ok(StoreUpdate {
            record,
            relevelled,
            changed,
        })
    }

    pub async fn bulk_set_active(
        &self,
        ids: &[Uuid],
        is_active: bool,
    ) -> Result<u64, CategoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.writer
            .set_active_bulk(ids, is_active)
            .await
            .map_err(CategoryError::from)
    }

    /// Removes one record. Children keep their now dangling `parent_id`.
    pub async fn delete(&self, id: Uuid) -> Result<(), CategoryError> {
        let removed = self.writer.delete_category(id).await?;
        if !removed {
            return Err(CategoryError::not_found(id));
        }
        Ok(())
    }

    /// Ancestors of `id` from the root down to its direct parent.
    pub async fn lineage(&self, id: Uuid) -> Result<Vec<CategoryRecord>, CategoryError> {
        let records = self.reader.list_all().await?;
        if !records.iter().any(|record| record.id == id) {
            return Err(CategoryError::not_found(id));
        }

        let index = ChildIndex::build(records.iter().map(|record| ParentLink {
            id: record.id,
            parent_id: record.parent_id,
        }));
        let mut by_id: HashMap<Uuid, CategoryRecord> = records
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        Ok(index
            .ancestors_of(id)
            .into_iter()
            .filter_map(|ancestor| by_id.remove(&ancestor))
            .collect())
    }

    pub async fn health_check(&self) -> Result<(), CategoryError> {
        self.reader
            .health_check()
            .await
            .map_err(CategoryError::StoreUnavailable)
    }

    async fn ensure_name_available(
        &self,
        name: &str,
        owner: Option<Uuid>,
    ) -> Result<(), CategoryError> {
        match self.reader.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(CategoryError::duplicate_name(name))
            }
            _ => Ok(()),
        }
    }

    async fn place(
        &self,
        existing: &CategoryRecord,
        parent_id: Option<Uuid>,
    ) -> Result<Placement, CategoryError> {
        let index = self.traversal.index().await?;
        let subtree = HierarchyTraversal::walk(&index, existing.id);

        let level = match parent_id {
            None => ROOT_LEVEL,
            Some(parent_id) if parent_id == existing.id => {
                return Err(DomainError::SelfParent { id: existing.id }.into());
            }
            Some(parent_id) if subtree.contains(&parent_id) => {
                return Err(DomainError::CyclicParent {
                    id: existing.id,
                    parent_id,
                }
                .into());
            }
            Some(parent_id) => {
                let parent = self
                    .reader
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| CategoryError::parent_not_found(parent_id))?;
                level_under(Some(parent.level))?
            }
        };

        ensure_subtree_fits(level, subtree.height())?;

        let mut descendants: Vec<Uuid> = subtree.into_ids().into_iter().collect();
        descendants.sort_unstable();

        Ok(Placement {
            parent_id,
            level,
            descendants,
        })
    }
}
