//! Category hierarchy: store, traversal, activation cascade and the
//! cache-consistent service wrapping them.

mod cascade;
mod error;
mod hierarchy;
mod service;
mod store;
#[cfg(test)]
mod test_support;
mod types;

pub use cascade::{CascadeEngine, CascadeOutcome, CascadePolicy};
pub use error::CategoryError;
pub use hierarchy::HierarchyTraversal;
pub use service::CategoryService;
pub use store::CategoryStore;
pub use types::{CategoryPatch, CreateCategoryCommand, StoreUpdate};
