use std::sync::{LazyLock, Mutex};

use dynamic_connectivity::{CutResult, DynamicConnectivity};
use flexi_logger::{Logger, LoggerHandle};

pub mod slow_forest;

#[allow(dead_code)]
pub static LOGGER: LazyLock<Mutex<LoggerHandle>> = LazyLock::new(|| {
    Mutex::new(
        Logger::try_with_env_or_str("info")
            .unwrap()
            .write_mode(flexi_logger::WriteMode::SupportCapture)
            .log_to_stdout()
            .set_palette("196;208;3;7;8".to_owned())
            .format(|w, now, record| {
                let style = flexi_logger::style(record.level());
                write!(
                    w,
                    "{} {pref}[{}] {}{suf}",
                    now.format("%H:%M:%S"),
                    &record.level().as_str()[0..1],
                    record.args(),
                    pref = style.prefix(),
                    suf = style.suffix(),
                )
            })
            .start()
            .unwrap(),
    )
});

#[allow(dead_code)]
pub fn init_logger() {
    let _ = &*LOGGER;
}

/// Brute force reference: keeps the edge multiset and rebuilds a union-find on every query.
#[allow(dead_code)]
#[derive(Clone)]
pub struct Dumb {
    n: usize,
    edges: Vec<(usize, usize)>,
}

impl std::fmt::Debug for Dumb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let groups = self.groups();
        let mut gs = vec![vec![]; self.n];
        for (v, &g) in groups.iter().enumerate() {
            gs[g].push(v);
        }
        gs.retain(|g| !g.is_empty());
        f.debug_struct("Dumb")
            .field("edges", &self.edges)
            .field("groups", &gs)
            .finish()
    }
}

fn find(parent: &mut [usize], mut u: usize) -> usize {
    while parent[u] != u {
        parent[u] = parent[parent[u]];
        u = parent[u];
    }
    u
}

#[allow(dead_code)]
impl Dumb {
    /// Representative of each vertex's component.
    pub fn groups(&self) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..self.n).collect();
        for &(u, v) in &self.edges {
            let (ru, rv) = (find(&mut parent, u), find(&mut parent, v));
            parent[ru] = rv;
        }
        (0..self.n).map(|u| find(&mut parent, u)).collect()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }
}

impl DynamicConnectivity for Dumb {
    fn new(n: usize) -> Self {
        Self { n, edges: vec![] }
    }

    fn link(&mut self, u: usize, v: usize) -> bool {
        assert!(u < self.n && v < self.n);
        if u == v {
            return false;
        }
        let connected = self.same(u, v);
        self.edges.push((u, v));
        !connected
    }

    fn cut(&mut self, u: usize, v: usize) -> CutResult {
        assert!(u < self.n && v < self.n);
        let Some(pos) = self
            .edges
            .iter()
            .position(|&e| e == (u, v) || e == (v, u))
        else {
            return CutResult::NoSuchEdge;
        };
        self.edges.swap_remove(pos);
        if self.same(u, v) {
            CutResult::StillConnected
        } else {
            CutResult::Disconnected
        }
    }

    fn same(&mut self, u: usize, v: usize) -> bool {
        let gs = self.groups();
        gs[u] == gs[v]
    }

    fn size(&mut self, u: usize) -> usize {
        let gs = self.groups();
        gs.iter().filter(|&&g| g == gs[u]).count()
    }

    fn component_count(&self) -> usize {
        let gs = self.groups();
        (0..self.n).filter(|&u| gs[u] == u).count()
    }
}
