//! Invalidation planning.
//!
//! Every mutation drops the listing plus one node entry per affected id.

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use super::keys::CacheKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationPlan {
    keys: BTreeSet<CacheKey>,
}

impl InvalidationPlan {
    /// Plan for a mutation that touched `affected`.
    pub fn for_mutation(affected: impl IntoIterator<Item = Uuid>) -> Self {
        let mut keys = BTreeSet::from([CacheKey::Collection]);
        keys.extend(affected.into_iter().map(CacheKey::Node));
        Self { keys }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Rendered keys in a stable order.
    pub fn rendered(&self) -> Vec<String> {
        self.keys.iter().map(CacheKey::render).collect()
    }
}

impl fmt::Display for InvalidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvalidationPlan {{ keys: {}, nodes: {} }}",
            self.keys.len(),
            self.keys
                .iter()
                .filter(|key| matches!(key, CacheKey::Node(_)))
                .count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_always_contains_collection() {
        let plan = InvalidationPlan::for_mutation(std::iter::empty());
        assert_eq!(plan.len(), 1);
        assert!(plan.contains(&CacheKey::Collection));
    }

    #[test]
    fn plan_deduplicates_affected_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let plan = InvalidationPlan::for_mutation([a, b, a]);

        assert_eq!(plan.len(), 3);
        assert!(plan.contains(&CacheKey::Node(a)));
        assert!(plan.contains(&CacheKey::Node(b)));
        assert!(plan.rendered().contains(&"categories".to_string()));
        assert_eq!(plan.to_string(), "InvalidationPlan { keys: 3, nodes: 2 }");
    }
}
