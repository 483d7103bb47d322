//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::categories::CategoryRecord;
use crate::domain::hierarchy::ParentLink;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateCategoryParams {
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub level: i16,
}

/// Field update for one category.
///
/// When the node moves, `descendants` lists the moved subtree and every one of
/// them has its level shifted by `level_delta` in the same unit of work.
#[derive(Debug, Clone)]
pub struct UpdateCategoryParams {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub level: i16,
    pub descendants: Vec<Uuid>,
    pub level_delta: i16,
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, RepoError>;

    /// Every record in creation order.
    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    /// `(id, parent_id)` projection of every record.
    async fn list_parent_links(&self) -> Result<Vec<ParentLink>, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CategoriesWriteRepo: Send + Sync {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    /// Sets `is_active` on every listed record in one write and returns how many records matched.
    async fn set_active_bulk(&self, ids: &[Uuid], is_active: bool) -> Result<u64, RepoError>;

    /// Returns `false` when no record with `id` existed.
    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError>;
}
