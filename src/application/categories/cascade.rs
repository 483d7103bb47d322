use std::collections::BTreeSet;

use tracing::{info, warn};
use uuid::Uuid;

use super::error::CategoryError;
use super::store::CategoryStore;

/// Which activation changes reach the descendants of the changed node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CascadePolicy {
    /// Deactivation reaches the whole subtree; reactivation only the node itself.
    #[default]
    DeactivationOnly,
    /// Both directions reach the whole subtree.
    Symmetric,
}

impl CascadePolicy {
    pub fn from_settings(reactivate_descendants: bool) -> Self {
        if reactivate_descendants {
            Self::Symmetric
        } else {
            Self::DeactivationOnly
        }
    }

    fn reaches_descendants(self, is_active: bool) -> bool {
        match self {
            Self::DeactivationOnly => !is_active,
            Self::Symmetric => true,
        }
    }
}

/// Ids written by one cascade. Empty when the root already held the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    affected: BTreeSet<Uuid>,
}

impl CascadeOutcome {
    pub fn affected(&self) -> &BTreeSet<Uuid> {
        &self.affected
    }

    pub fn into_affected(self) -> BTreeSet<Uuid> {
        self.affected
    }

    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }
}

#[derive(Clone)]
pub struct CascadeEngine {
    store: CategoryStore,
    policy: CascadePolicy,
}

impl CascadeEngine {
    pub fn new(store: CategoryStore, policy: CascadePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> CascadePolicy {
        self.policy
    }

    /// Pushes `is_active` onto `root_id` and, per policy, onto its whole subtree
    /// in a single bulk write.
    pub async fn cascade_active_state(
        &self,
        root_id: Uuid,
        is_active: bool,
    ) -> Result<CascadeOutcome, CategoryError> {
        let root = self.store.get(root_id).await?;
        if root.is_active == is_active {
            return Ok(CascadeOutcome::default());
        }

        let mut targets = BTreeSet::from([root_id]);
        if self.policy.reaches_descendants(is_active) {
            let descendants = self.store.traversal().descendants_of(root_id).await?;
            targets.extend(descendants.into_ids());
        }

        let attempted: Vec<Uuid> = targets.iter().copied().collect();
        let updated = self.store.bulk_set_active(&attempted, is_active).await?;
        let expected = attempted.len();

        if updated < expected as u64 {
            warn!(
                root = %root_id,
                is_active,
                expected,
                updated,
                "Cascade updated fewer categories than requested"
            );
            return Err(CategoryError::PartialCascade {
                attempted,
                expected,
                updated,
            });
        }

        info!(
            root = %root_id,
            is_active,
            affected = expected,
            policy = ?self.policy,
            "Activation cascade applied"
        );
        Ok(CascadeOutcome { affected: targets })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::categories::test_support::ShortCountingWriter;
    use crate::application::categories::types::CreateCategoryCommand;
    use crate::application::repos::CategoriesRepo;
    use crate::infra::memory::InMemoryCategories;

    struct Fixture {
        repo: Arc<InMemoryCategories>,
        store: CategoryStore,
    }

    impl Fixture {
        fn new() -> Self {
            let repo = Arc::new(InMemoryCategories::new());
            let store = CategoryStore::new(repo.clone(), repo.clone());
            Self { repo, store }
        }

        fn engine(&self, policy: CascadePolicy) -> CascadeEngine {
            CascadeEngine::new(self.store.clone(), policy)
        }

        async fn create(&self, name: &str, parent_id: Option<Uuid>) -> Uuid {
            self.store
                .create(CreateCategoryCommand {
                    name: name.to_string(),
                    parent_id,
                })
                .await
                .expect("create category")
                .id
        }

        async fn active(&self, id: Uuid) -> bool {
            self.repo
                .find_by_id(id)
                .await
                .unwrap()
                .expect("record exists")
                .is_active
        }
    }

    #[tokio::test]
    async fn deactivation_reaches_every_descendant_and_nothing_else() {
        let fx = Fixture::new();
        let a = fx.create("A", None).await;
        let b = fx.create("B", Some(a)).await;
        let c = fx.create("C", Some(b)).await;
        let d = fx.create("D", Some(a)).await;
        let other = fx.create("Other", None).await;

        let outcome = fx
            .engine(CascadePolicy::default())
            .cascade_active_state(a, false)
            .await
            .unwrap();

        assert_eq!(outcome.affected(), &BTreeSet::from([a, b, c, d]));
        for id in [a, b, c, d] {
            assert!(!fx.active(id).await);
        }
        assert!(fx.active(other).await);
    }

    #[tokio::test]
    async fn unchanged_value_writes_nothing() {
        let fx = Fixture::new();
        let a = fx.create("A", None).await;

        let outcome = fx
            .engine(CascadePolicy::Symmetric)
            .cascade_active_state(a, true)
            .await
            .unwrap();
        assert!(outcome.is_empty());
    }

    #[tokio::test]
    async fn default_policy_reactivates_only_the_root() {
        let fx = Fixture::new();
        let a = fx.create("A", None).await;
        let b = fx.create("B", Some(a)).await;
        let c = fx.create("C", Some(a)).await;
        let engine = fx.engine(CascadePolicy::DeactivationOnly);

        engine.cascade_active_state(c, false).await.unwrap();
        engine.cascade_active_state(a, false).await.unwrap();
        let outcome = engine.cascade_active_state(a, true).await.unwrap();

        assert_eq!(outcome.affected(), &BTreeSet::from([a]));
        assert!(fx.active(a).await);
        assert!(!fx.active(b).await);
        assert!(!fx.active(c).await);
    }

    #[tokio::test]
    async fn symmetric_policy_reactivates_subtree() {
        let fx = Fixture::new();
        let a = fx.create("A", None).await;
        let b = fx.create("B", Some(a)).await;
        let engine = fx.engine(CascadePolicy::from_settings(true));
        assert_eq!(engine.policy(), CascadePolicy::Symmetric);

        engine.cascade_active_state(a, false).await.unwrap();
        let outcome = engine.cascade_active_state(a, true).await.unwrap();

        assert_eq!(outcome.affected(), &BTreeSet::from([a, b]));
        assert!(fx.active(b).await);
    }

    #[tokio::test]
    async fn short_count_is_a_partial_cascade_with_attempted_ids() {
        let repo = Arc::new(InMemoryCategories::new());
        let writer = Arc::new(ShortCountingWriter {
            inner: (*repo).clone(),
        });
        let store = CategoryStore::new(repo.clone(), writer);
        let a = store
            .create(CreateCategoryCommand {
                name: "A".to_string(),
                parent_id: None,
            })
            .await
            .unwrap();
        let b = store
            .create(CreateCategoryCommand {
                name: "B".to_string(),
                parent_id: Some(a.id),
            })
            .await
            .unwrap();

        let err = CascadeEngine::new(store, CascadePolicy::default())
            .cascade_active_state(a.id, false)
            .await
            .unwrap_err();

        match err {
            CategoryError::PartialCascade {
                attempted,
                expected,
                updated,
            } => {
                assert_eq!(expected, 2);
                assert_eq!(updated, 1);
                let attempted: BTreeSet<Uuid> = attempted.into_iter().collect();
                assert_eq!(attempted, BTreeSet::from([a.id, b.id]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_root_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .engine(CascadePolicy::default())
            .cascade_active_state(Uuid::new_v4(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::NotFound { .. }));
    }
}
