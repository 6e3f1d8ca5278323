//! Surplus (non-tree) edges of one level, bucketed by endpoint.

use fxhash::FxBuildHasher;
use indexmap::IndexSet;

pub type EdgeId = usize;

type Bucket = IndexSet<EdgeId, FxBuildHasher>;

#[derive(Debug, Clone)]
pub struct SurplusBuckets {
    buckets: Vec<Bucket>,
    /// Number of entries over all buckets. Each surplus edge has two.
    total: usize,
}

impl SurplusBuckets {
    /// Empty buckets for vertices `0..n`.
    pub fn new(n: usize) -> Self {
        Self {
            buckets: (0..n).map(|_| Bucket::default()).collect(),
            total: 0,
        }
    }

    /// Adds edge e to the bucket of u. Returns whether the bucket was empty before.
    pub fn insert(&mut self, u: usize, e: EdgeId) -> bool {
        let was_empty = self.buckets[u].is_empty();
        let added = self.buckets[u].insert(e);
        assert!(added, "edge {e} already in the bucket of {u}");
        self.total += 1;
        was_empty
    }

    /// Removes edge e from the bucket of u. Returns whether it was there.
    pub fn erase(&mut self, u: usize, e: EdgeId) -> bool {
        let removed = self.buckets[u].swap_remove(&e);
        if removed {
            self.total -= 1;
        }
        removed
    }

    /// Removes and returns some edge from the bucket of u.
    pub fn erase_any(&mut self, u: usize) -> Option<EdgeId> {
        let e = self.buckets[u].pop()?;
        self.total -= 1;
        Some(e)
    }

    /// Some edge in the bucket of u, without removing it.
    pub fn any(&self, u: usize) -> Option<EdgeId> {
        self.buckets[u].last().copied()
    }

    pub fn is_empty(&self, u: usize) -> bool {
        self.buckets[u].is_empty()
    }

    /// Number of entries over all buckets.
    pub fn total(&self) -> usize {
        self.total
    }
}
