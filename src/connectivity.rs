//! The connectivity façade. Tree edges live in the forests of levels `0..=level`, the other
//! edges in surplus buckets; cutting a tree edge searches for a replacement from its level down.

use fxhash::FxHashMap;

use crate::{
    alg_panic,
    levels::Levels,
    or_alg_panic,
    surplus::EdgeId,
    top_tree::{Idx, Mark},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutResult {
    /// There was no edge between the vertices.
    NoSuchEdge,
    /// The edge was removed, and its endpoints are still connected.
    StillConnected,
    /// The edge was a bridge.
    Disconnected,
}

pub trait DynamicConnectivity {
    /// New instance for an empty graph on n nodes
    fn new(n: usize) -> Self;
    /// Add an edge between u and v. Returns whether it connected two components.
    fn link(&mut self, u: usize, v: usize) -> bool;
    /// Remove an edge between u and v.
    fn cut(&mut self, u: usize, v: usize) -> CutResult;
    /// Check if u and v are connected.
    fn same(&mut self, u: usize, v: usize) -> bool;
    /// Number of vertices in the component of u.
    fn size(&mut self, u: usize) -> usize;
    /// Number of connected components.
    fn component_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct EdgeInfo {
    /// u < v
    e: (usize, usize),
    /// Level of the edge
    level: usize,
    /// One node for each level 0..=level. Empty if it is a surplus edge.
    tree_nodes: Vec<Idx>,
}

impl EdgeInfo {
    fn is_tree(&self) -> bool {
        !self.tree_nodes.is_empty()
    }
}

/// Counters of the work done by replacement searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Surplus edges moved one level up.
    pub surplus_promotions: usize,
    /// Tree edges moved one level up.
    pub tree_promotions: usize,
    /// Cuts of tree edges, each starting a search.
    pub replacement_searches: usize,
    /// Searches that found a replacement edge.
    pub replacements_found: usize,
}

impl Stats {
    pub fn promotions(&self) -> usize {
        self.surplus_promotions + self.tree_promotions
    }
}

/// Fully dynamic connectivity on a fixed set of vertices, with amortized O(log² n) updates.
///
/// Parallel edges are allowed; each call to `link` adds a new one.
#[derive(Debug)]
pub struct Connectivity {
    levels: Levels,
    edge_info: Vec<Option<EdgeInfo>>,
    free_ids: Vec<EdgeId>,
    // (u, v) -> ids, u < v
    e_to_ids: FxHashMap<(usize, usize), Vec<EdgeId>>,
    edge_count: usize,
    components: usize,
    stats: Stats,
}

fn key(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

impl Connectivity {
    fn check_vertex(&self, u: usize) {
        assert!(
            u < self.num_vertices(),
            "vertex {u} out of range for {} vertices",
            self.num_vertices()
        );
    }

    fn info(&self, id: EdgeId) -> &EdgeInfo {
        or_alg_panic(self.edge_info[id].as_ref())
    }

    fn info_mut(&mut self, id: EdgeId) -> &mut EdgeInfo {
        or_alg_panic(self.edge_info[id].as_mut())
    }

    pub fn num_vertices(&self) -> usize {
        self.levels.level(0).forest.num_vertices()
    }

    /// Number of edges currently in the graph, counting parallel edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains_edge(&self, u: usize, v: usize) -> bool {
        self.e_to_ids.contains_key(&key(u, v))
    }

    /// Number of levels instantiated so far.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn max_levels(&self) -> usize {
        self.levels.max_levels()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of edges that are not in the spanning forest.
    pub fn surplus_count(&self) -> usize {
        (0..self.levels.len())
            .map(|l| self.levels.surplus_count(l))
            .sum()
    }

    fn debug_check_counts(&self) {
        debug_assert_eq!(
            self.edge_count,
            self.surplus_count() + self.num_vertices() - self.components,
            "edge count out of sync"
        );
    }

    fn new_edge(&mut self, u: usize, v: usize) -> EdgeId {
        let info = EdgeInfo {
            e: key(u, v),
            level: 0,
            tree_nodes: vec![],
        };
        let id = match self.free_ids.pop() {
            Some(id) => {
                self.edge_info[id] = Some(info);
                id
            }
            None => {
                self.edge_info.push(Some(info));
                self.edge_info.len() - 1
            }
        };
        self.e_to_ids.entry(key(u, v)).or_default().push(id);
        self.edge_count += 1;
        id
    }

    /// Takes out an edge between u and v, preferring surplus edges over the tree edge.
    fn take_edge(&mut self, u: usize, v: usize) -> Option<(EdgeId, EdgeInfo)> {
        let ids = self.e_to_ids.get_mut(&key(u, v))?;
        let pos = ids
            .iter()
            .position(|&id| !or_alg_panic(self.edge_info[id].as_ref()).is_tree())
            .unwrap_or(0);
        let id = ids.swap_remove(pos);
        if ids.is_empty() {
            self.e_to_ids.remove(&key(u, v));
        }
        self.free_ids.push(id);
        self.edge_count -= 1;
        Some((id, or_alg_panic(self.edge_info[id].take())))
    }

    /// Makes edge id a tree edge of the given level, adding it to the forests 0..=level.
    fn add_tree_edge(&mut self, id: EdgeId, level: usize) {
        let (u, v) = self.info(id).e;
        let tree_nodes: Vec<Idx> = (0..=level)
            .map(|l| {
                let forest = self.levels.forest(l);
                let node = forest.new_edge_node(id);
                forest.link(node, u, v);
                node
            })
            .collect();
        self.levels.forest(level).set_marked(tree_nodes[level], true);
        let info = self.info_mut(id);
        info.level = level;
        info.tree_nodes = tree_nodes;
    }

    /// Moves all tree edges of the given level on the tree containing u one level up.
    fn promote_tree_edges(&mut self, level: usize, u: usize) {
        let found = self.levels.forest(level).enumerate_marked(u, Mark::Edge);
        if found.is_empty() {
            return;
        }
        self.levels.ensure_level(level + 1);
        for node in found {
            let id = or_alg_panic(self.levels.forest(level).edge_of(node));
            let (a, b) = self.info(id).e;
            let forest = self.levels.forest(level + 1);
            let up = forest.new_edge_node(id);
            forest.link(up, a, b);
            forest.set_marked(up, true);
            let info = self.info_mut(id);
            debug_assert_eq!(info.level, level);
            info.level = level + 1;
            info.tree_nodes.push(up);
            self.stats.tree_promotions += 1;
        }
        log::trace!("Promoted tree edges of {u}'s tree from level {level}");
    }

    /// Looks for an edge reconnecting the trees of u and v, from the given level down to 0.
    /// Returns whether one was found.
    fn replace(&mut self, u: usize, v: usize, top_level: usize) -> bool {
        self.stats.replacement_searches += 1;
        for level in (0..=top_level).rev() {
            let forest = self.levels.forest(level);
            let small = if forest.size(u) <= forest.size(v) {
                u
            } else {
                v
            };
            self.promote_tree_edges(level, small);
            while let Some(w) = self.levels.forest(level).find_marked(small, Mark::Vertex) {
                while let Some(id) = self.levels.erase_any_surplus(level, w) {
                    let (a, b) = self.info(id).e;
                    let other = if a == w { b } else { a };
                    if !self.levels.erase_surplus(level, other, id) {
                        alg_panic()
                    }
                    if self.levels.forest(level).same(small, other) {
                        self.levels.ensure_level(level + 1);
                        self.levels.insert_surplus(level + 1, a, id);
                        self.levels.insert_surplus(level + 1, b, id);
                        self.info_mut(id).level = level + 1;
                        self.stats.surplus_promotions += 1;
                    } else {
                        log::debug!("Edge {a} {b} replaces {u} {v} on level {level}");
                        self.add_tree_edge(id, level);
                        self.stats.replacements_found += 1;
                        return true;
                    }
                }
            }
        }
        false
    }
}

impl DynamicConnectivity for Connectivity {
    fn new(n: usize) -> Self {
        Self {
            levels: Levels::new(n),
            edge_info: Vec::new(),
            free_ids: Vec::new(),
            e_to_ids: FxHashMap::default(),
            edge_count: 0,
            components: n,
            stats: Stats::default(),
        }
    }

    fn link(&mut self, u: usize, v: usize) -> bool {
        self.check_vertex(u);
        self.check_vertex(v);
        if u == v {
            return false;
        }
        let id = self.new_edge(u, v);
        if self.levels.forest(0).same(u, v) {
            self.levels.insert_surplus(0, u, id);
            self.levels.insert_surplus(0, v, id);
            log::trace!("Edge {u} {v} is surplus");
            self.debug_check_counts();
            false
        } else {
            self.add_tree_edge(id, 0);
            self.components -= 1;
            log::trace!("Edge {u} {v} is a tree edge");
            self.debug_check_counts();
            true
        }
    }

    fn cut(&mut self, u: usize, v: usize) -> CutResult {
        self.check_vertex(u);
        self.check_vertex(v);
        if u == v {
            return CutResult::NoSuchEdge;
        }
        let Some((id, info)) = self.take_edge(u, v) else {
            return CutResult::NoSuchEdge;
        };
        let (a, b) = info.e;
        if !info.is_tree() {
            let erased_a = self.levels.erase_surplus(info.level, a, id);
            let erased_b = self.levels.erase_surplus(info.level, b, id);
            if !(erased_a && erased_b) {
                alg_panic()
            }
            log::trace!("Removed surplus edge {a} {b}");
            self.debug_check_counts();
            return CutResult::StillConnected;
        }
        for (level, &node) in info.tree_nodes.iter().enumerate() {
            let forest = self.levels.forest(level);
            if !forest.cut(node, a, b) {
                alg_panic()
            }
            forest.release_edge_node(node);
        }
        let result = if self.replace(a, b, info.level) {
            CutResult::StillConnected
        } else {
            self.components += 1;
            log::debug!("Edge {a} {b} was a bridge");
            CutResult::Disconnected
        };
        self.debug_check_counts();
        result
    }

    fn same(&mut self, u: usize, v: usize) -> bool {
        self.check_vertex(u);
        self.check_vertex(v);
        self.levels.forest(0).same(u, v)
    }

    fn size(&mut self, u: usize) -> usize {
        self.check_vertex(u);
        self.levels.forest(0).size(u)
    }

    fn component_count(&self) -> usize {
        self.components
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};

    use super::*;

    fn assert_levels_nested(t: &mut Connectivity) {
        let n = t.num_vertices();
        for l in 0..t.level_count() {
            for u in 0..n {
                assert!(
                    t.levels.forest(l).size(u) <= n >> l,
                    "component of {u} too big on level {l}"
                );
                if l == 0 {
                    continue;
                }
                for v in 0..n {
                    if t.levels.forest(l).same(u, v) {
                        assert!(t.levels.forest(l - 1).same(u, v), "l {l} u {u} v {v}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_levels_stay_nested() {
        const N: usize = 32;
        let mut t = Connectivity::new(N);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1729);
        let mut edges = vec![];
        for _ in 0..2000 {
            if edges.is_empty() || rng.gen_bool(0.55) {
                let (u, v) = (rng.gen_range(0..N), rng.gen_range(0..N));
                if u != v {
                    t.link(u, v);
                    edges.push((u, v));
                }
            } else {
                let (u, v) = edges.swap_remove(rng.gen_range(0..edges.len()));
                assert_ne!(t.cut(u, v), CutResult::NoSuchEdge);
            }
            assert_levels_nested(&mut t);
        }
        assert!(t.level_count() > 1);
    }

    #[test]
    fn test_edge_levels_match_forests() {
        const N: usize = 16;
        let mut t = Connectivity::new(N);
        let mut rng = rand::rngs::StdRng::seed_from_u64(31337);
        let mut edges = vec![];
        for _ in 0..2000 {
            if edges.is_empty() || rng.gen_bool(0.6) {
                let (u, v) = (rng.gen_range(0..N), rng.gen_range(0..N));
                if u != v {
                    t.link(u, v);
                    edges.push((u, v));
                }
            } else {
                let (u, v) = edges.swap_remove(rng.gen_range(0..edges.len()));
                t.cut(u, v);
            }
        }
        let infos: Vec<EdgeInfo> = t.edge_info.iter().flatten().cloned().collect();
        assert_eq!(infos.len(), t.edge_count());
        for info in infos {
            let (a, b) = info.e;
            assert!(info.level < t.level_count());
            if info.is_tree() {
                assert_eq!(info.tree_nodes.len(), info.level + 1);
                let top = info.tree_nodes[info.level];
                assert!(t.levels.forest(info.level).is_marked(top));
                for l in 0..=info.level {
                    assert!(t.levels.forest(l).same(a, b));
                }
            } else {
                assert!(t.levels.has_surplus(info.level, a));
                assert!(t.levels.has_surplus(info.level, b));
                assert!(t.levels.forest(info.level).same(a, b));
            }
        }
    }
}
