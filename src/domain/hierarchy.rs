//! Parent-link index over the category arena and bounded downward traversal.
//!
//! The index is built once from an `(id, parent_id)` projection and can answer
//! several traversals for the same operation. Walks keep a visited set so a
//! corrupted parent graph terminates instead of looping.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Levels below the starting node a traversal is allowed to descend.
pub const MAX_TRAVERSAL_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct ChildIndex {
    children: HashMap<Uuid, Vec<Uuid>>,
    parents: HashMap<Uuid, Option<Uuid>>,
}

/// Result of a downward walk. The starting node is never part of `ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descendants {
    ids: HashSet<Uuid>,
    height: usize,
    cycle_detected: bool,
    truncated: bool,
}

impl Descendants {
    pub fn ids(&self) -> &HashSet<Uuid> {
        &self.ids
    }

    pub fn into_ids(self) -> HashSet<Uuid> {
        self.ids
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of levels reached below the starting node.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cycle_detected(&self) -> bool {
        self.cycle_detected
    }

    /// True when the depth bound stopped the walk before the subtree was exhausted.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl ChildIndex {
    pub fn build(links: impl IntoIterator<Item = ParentLink>) -> Self {
        let mut index = Self::default();
        for link in links {
            index.parents.insert(link.id, link.parent_id);
            if let Some(parent) = link.parent_id {
                index.children.entry(parent).or_default().push(link.id);
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.parents.contains_key(id)
    }

    pub fn children_of(&self, id: &Uuid) -> &[Uuid] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: &Uuid) -> Option<Uuid> {
        self.parents.get(id).copied().flatten()
    }

    pub fn descendants_of(&self, root: Uuid) -> Descendants {
        self.descendants_within(root, MAX_TRAVERSAL_DEPTH)
    }

    /// Breadth-first walk bounded to `max_depth` levels below `root`.
    pub fn descendants_within(&self, root: Uuid, max_depth: usize) -> Descendants {
        let mut result = Descendants::default();
        let mut visited = HashSet::from([root]);
        let mut frontier = vec![root];
        let mut depth = 0;

        while !frontier.is_empty() {
            if depth == max_depth {
                result.truncated = frontier.iter().any(|node| {
                    self.children_of(node)
                        .iter()
                        .any(|child| !visited.contains(child))
                });
                break;
            }

            let mut next = Vec::new();
            for node in &frontier {
                for child in self.children_of(node) {
                    if visited.insert(*child) {
                        result.ids.insert(*child);
                        next.push(*child);
                    } else {
                        result.cycle_detected = true;
                    }
                }
            }

            if !next.is_empty() {
                depth += 1;
                result.height = depth;
            }
            frontier = next;
        }

        result
    }

    /// Ancestors of `id` ordered from the root down to the direct parent.
    ///
    /// Stops at a parent that is missing from the index or already seen.
    pub fn ancestors_of(&self, id: Uuid) -> Vec<Uuid> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut cursor = self.parent_of(&id);

        while let Some(parent) = cursor {
            if !self.contains(&parent) || !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            cursor = self.parent_of(&parent);
        }

        chain.reverse();
        chain
    }
}
