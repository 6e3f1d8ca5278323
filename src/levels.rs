//! The level hierarchy: one forest and one set of surplus buckets per level.
//!
//! The forest of level `l` spans the edges of level at least `l`, so its trees only shrink
//! as `l` grows, and each of them has at most `n / 2^l` vertices. A vertex is marked on the
//! forest of level `l` exactly when it has surplus edges of level `l`.

use crate::{
    surplus::{EdgeId, SurplusBuckets},
    top_tree::TopTree,
};

#[derive(Debug)]
pub struct Level {
    pub forest: TopTree,
    pub surplus: SurplusBuckets,
}

impl Level {
    fn new(n: usize) -> Self {
        Self {
            forest: TopTree::new(n),
            surplus: SurplusBuckets::new(n),
        }
    }
}

#[derive(Debug)]
pub struct Levels {
    n: usize,
    max_levels: usize,
    levels: Vec<Level>,
}

/// Number of levels ever needed for a graph on n vertices.
pub fn max_levels(n: usize) -> usize {
    (n.next_power_of_two().trailing_zeros() as usize) + 1
}

impl Levels {
    /// Only level 0 is created, the others come with `make_new_level`.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            max_levels: max_levels(n),
            levels: vec![Level::new(n)],
        }
    }

    /// Number of instantiated levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Instantiates the next level, with every vertex isolated. Returns it.
    pub fn make_new_level(&mut self) -> usize {
        let level = self.levels.len();
        assert!(
            level < self.max_levels,
            "level {level} is over the bound of {} levels",
            self.max_levels
        );
        log::debug!("Creating level {level}");
        self.levels.push(Level::new(self.n));
        level
    }

    /// Makes sure the given level exists.
    pub fn ensure_level(&mut self, level: usize) {
        while self.levels.len() <= level {
            self.make_new_level();
        }
    }

    pub fn forest(&mut self, level: usize) -> &mut TopTree {
        &mut self.levels[level].forest
    }

    pub fn level(&self, level: usize) -> &Level {
        &self.levels[level]
    }

    pub fn insert_surplus(&mut self, level: usize, u: usize, e: EdgeId) {
        let l = &mut self.levels[level];
        if l.surplus.insert(u, e) {
            l.forest.set_marked(u, true);
        }
        self.debug_check_mark(level, u);
    }

    /// Returns whether e was a surplus edge of u on this level.
    pub fn erase_surplus(&mut self, level: usize, u: usize, e: EdgeId) -> bool {
        let l = &mut self.levels[level];
        let erased = l.surplus.erase(u, e);
        if erased && l.surplus.is_empty(u) {
            l.forest.set_marked(u, false);
        }
        self.debug_check_mark(level, u);
        erased
    }

    /// Removes and returns some surplus edge of u on this level.
    pub fn erase_any_surplus(&mut self, level: usize, u: usize) -> Option<EdgeId> {
        let l = &mut self.levels[level];
        let e = l.surplus.erase_any(u)?;
        if l.surplus.is_empty(u) {
            l.forest.set_marked(u, false);
        }
        self.debug_check_mark(level, u);
        Some(e)
    }

    pub fn has_surplus(&self, level: usize, u: usize) -> bool {
        self.levels[level].surplus.any(u).is_some()
    }

    /// Number of surplus edges on this level.
    pub fn surplus_count(&self, level: usize) -> usize {
        self.levels[level].surplus.total() / 2
    }

    fn debug_check_mark(&self, level: usize, u: usize) {
        debug_assert_eq!(
            self.levels[level].forest.is_marked(u),
            self.has_surplus(level, u),
            "mark of {u} out of sync on level {level}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_levels() {
        assert_eq!(max_levels(1), 1);
        assert_eq!(max_levels(2), 2);
        assert_eq!(max_levels(5), 4);
        assert_eq!(max_levels(8), 4);
        assert_eq!(max_levels(1000), 11);
    }

    #[test]
    fn test_make_new_level() {
        let mut l = Levels::new(8);
        assert_eq!(l.len(), 1);
        l.ensure_level(2);
        assert_eq!(l.len(), 3);
        l.ensure_level(1);
        assert_eq!(l.len(), 3);
        assert_eq!(l.make_new_level(), 3);
        assert_eq!(l.forest(3).size(2), 1);
    }

    #[test]
    #[should_panic]
    fn test_too_many_levels() {
        let mut l = Levels::new(2);
        l.ensure_level(2);
    }

    #[test]
    fn test_marks_follow_buckets() {
        let mut l = Levels::new(3);
        l.insert_surplus(0, 1, 10);
        l.insert_surplus(0, 1, 11);
        l.insert_surplus(0, 2, 10);
        l.insert_surplus(0, 2, 11);
        assert!(l.has_surplus(0, 1));
        assert_eq!(l.surplus_count(0), 2);
        assert!(l.level(0).forest.is_marked(1));
        assert!(l.erase_surplus(0, 1, 10));
        assert!(l.level(0).forest.is_marked(1));
        assert_eq!(l.erase_any_surplus(0, 1), Some(11));
        assert!(!l.level(0).forest.is_marked(1));
        assert!(!l.erase_surplus(0, 1, 11));
        assert_eq!(l.erase_any_surplus(0, 1), None);
    }
}
