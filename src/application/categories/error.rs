use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("{0}")]
    Validation(String),
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("cascade updated {updated} of {expected} categories")]
    PartialCascade {
        attempted: Vec<Uuid>,
        expected: usize,
        updated: u64,
    },
    #[error("category store unavailable")]
    StoreUnavailable(#[source] RepoError),
}

impl CategoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "category",
            id,
        }
    }

    pub fn parent_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "parent category",
            id,
        }
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::Validation(format!("category name `{name}` already exists"))
    }

    /// Maps a repository failure on a known record, turning a vanished row into `NotFound`.
    pub fn from_repo_for(id: Uuid, err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::not_found(id),
            other => Self::from(other),
        }
    }
}

impl From<DomainError> for CategoryError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RepoError> for CategoryError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { constraint } => {
                Self::Validation(format!("category name already exists ({constraint})"))
            }
            RepoError::InvalidInput { message } => Self::Validation(message),
            other => Self::StoreUnavailable(other),
        }
    }
}
