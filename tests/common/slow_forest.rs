#![allow(dead_code)]

/// Dummy forest where every operation takes linear time. Edges are kept as an adjacency list.
#[derive(Debug)]
pub struct SlowForest {
    adj: Vec<Vec<usize>>,
}

#[allow(dead_code)]
impl SlowForest {
    pub fn new(n: usize) -> Self {
        Self {
            adj: vec![vec![]; n],
        }
    }

    pub fn link(&mut self, u: usize, v: usize) {
        assert!(!self.same(u, v));
        self.adj[u].push(v);
        self.adj[v].push(u);
    }

    pub fn cut(&mut self, u: usize, v: usize) {
        let pu = self.adj[u].iter().position(|&w| w == v).unwrap();
        self.adj[u].swap_remove(pu);
        let pv = self.adj[v].iter().position(|&w| w == u).unwrap();
        self.adj[v].swap_remove(pv);
    }

    pub fn component(&self, u: usize) -> Vec<usize> {
        let mut seen = vec![false; self.adj.len()];
        let mut stack = vec![u];
        seen[u] = true;
        let mut comp = vec![];
        while let Some(u) = stack.pop() {
            comp.push(u);
            for &v in &self.adj[u] {
                if !seen[v] {
                    seen[v] = true;
                    stack.push(v);
                }
            }
        }
        comp.sort();
        comp
    }

    pub fn same(&self, u: usize, v: usize) -> bool {
        self.component(u).contains(&v)
    }

    pub fn size(&self, u: usize) -> usize {
        self.component(u).len()
    }
}
