use uuid::Uuid;

use crate::domain::categories::CategoryRecord;

#[derive(Debug, Clone)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

/// Partial update of a category.
///
/// `parent_id` distinguishes "leave as is" (`None`) from "detach to root"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub parent_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none() && self.is_active.is_none()
    }
}

/// Outcome of a store-level update.
#[derive(Debug, Clone)]
pub struct StoreUpdate {
    pub record: CategoryRecord,
    /// Descendants whose level was shifted by a move.
    pub relevelled: Vec<Uuid>,
    /// False when the patch matched the stored state and nothing was written.
    pub changed: bool,
}

impl StoreUpdate {
    /// Ids whose stored state differs after this update.
    pub fn touched(&self) -> Vec<Uuid> {
        if !self.changed {
            return Vec::new();
        }
        let mut ids = Vec::with_capacity(self.relevelled.len() + 1);
        ids.push(self.record.id);
        ids.extend(self.relevelled.iter().copied());
        ids
    }
}
