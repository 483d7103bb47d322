//! Category records and the rules a single node must satisfy.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Level of a category without a parent.
pub const ROOT_LEVEL: i16 = 1;
/// Deepest level any category may occupy.
pub const MAX_LEVEL: i16 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub level: i16,
    pub is_active: bool,
    /// Direct children, only present on listings that asked for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Uuid>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CategoryRecord {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Trims a requested name and rejects blank input.
pub fn normalize_name(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Level a node takes when attached under a parent of `parent_level`.
pub fn level_under(parent_level: Option<i16>) -> Result<i16, DomainError> {
    match parent_level {
        None => Ok(ROOT_LEVEL),
        Some(level) => {
            let requested = level.saturating_add(1);
            if requested > MAX_LEVEL {
                return Err(DomainError::depth_exceeded(MAX_LEVEL, requested));
            }
            Ok(requested)
        }
    }
}

/// Checks that a subtree `height` levels tall still fits once its root sits at `new_level`.
pub fn ensure_subtree_fits(new_level: i16, height: usize) -> Result<(), DomainError> {
    let height = i16::try_from(height).unwrap_or(i16::MAX);
    let deepest = new_level.saturating_add(height);
    if deepest > MAX_LEVEL {
        return Err(DomainError::depth_exceeded(MAX_LEVEL, deepest));
    }
    Ok(())
}
