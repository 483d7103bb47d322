use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("category name is required")]
    EmptyName,
    #[error("cannot nest categories more than {max} levels deep (requested level {requested})")]
    DepthExceeded { max: i16, requested: i16 },
    #[error("category `{id}` cannot be its own parent")]
    SelfParent { id: Uuid },
    #[error("category `{id}` cannot be moved under its descendant `{parent_id}`")]
    CyclicParent { id: Uuid, parent_id: Uuid },
}

impl DomainError {
    pub fn depth_exceeded(max: i16, requested: i16) -> Self {
        Self::DepthExceeded { max, requested }
    }
}
