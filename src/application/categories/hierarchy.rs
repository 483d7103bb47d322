use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::application::repos::CategoriesRepo;
use crate::domain::hierarchy::{ChildIndex, Descendants, MAX_TRAVERSAL_DEPTH};

use super::error::CategoryError;

/// Resolves descendant sets from a single `(id, parent_id)` projection.
#[derive(Clone)]
pub struct HierarchyTraversal {
    reader: Arc<dyn CategoriesRepo>,
}

impl HierarchyTraversal {
    pub fn new(reader: Arc<dyn CategoriesRepo>) -> Self {
        Self { reader }
    }

    /// Loads the parent-link projection once; reuse it for several walks.
    pub async fn index(&self) -> Result<ChildIndex, CategoryError> {
        let links = self.reader.list_parent_links().await?;
        Ok(ChildIndex::build(links))
    }

    pub async fn descendants_of(&self, root: Uuid) -> Result<Descendants, CategoryError> {
        let index = self.index().await?;
        Ok(Self::walk(&index, root))
    }

    /// Walks a prepared index and reports anomalies in the parent graph.
    pub fn walk(index: &ChildIndex, root: Uuid) -> Descendants {
        let descendants = index.descendants_of(root);
        if descendants.cycle_detected() {
            warn!(
                root = %root,
                reached = descendants.len(),
                "Cycle detected in category parent links"
            );
        }
        if descendants.truncated() {
            warn!(
                root = %root,
                max_depth = MAX_TRAVERSAL_DEPTH,
                reached = descendants.len(),
                "Category traversal stopped at depth bound"
            );
        }
        descendants
    }
}
