//! Top tree over an arena of nodes, used as the spanning forest of a single level.
//!
//! Each preferred path lives in a "heavy" splay tree, ordered from the tree root downwards.
//! The heavy splay trees of all other paths hang off the node right above their topmost
//! node, organized as that node's "light" splay tree. Aggregates cover a node's heavy
//! subtree plus everything hanging from it, so after `expose(v)` the aggregate stored in `v`
//! describes the whole tree.
//!
//! Tree edges are nodes too: linking `s` and `t` through edge node `e` creates the tree
//! edges `s - e` and `e - t`.

use std::fmt::{Debug, Display, Formatter};

use debug_tree::{add_branch_to, add_leaf_to, AsTree, TreeBuilder};
use derivative::Derivative;

use crate::alg_panic;

pub type Idx = usize;

fn node_fmt(u: &Idx, f: &mut Formatter) -> std::fmt::Result {
    if *u == TopTree::EMPTY {
        write!(f, "∅")
    } else {
        write!(f, "{u}")
    }
}
fn node2_fmt([u, v]: &[Idx; 2], f: &mut Formatter) -> std::fmt::Result {
    write!(f, "[")?;
    node_fmt(u, f)?;
    write!(f, ", ")?;
    node_fmt(v, f)?;
    write!(f, "]")
}

/// Used to pretty print a Idx, outputting ∅ if it is EMPTY.
pub struct PrettyIdx(pub Idx);

impl Display for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        node_fmt(&self.0, f)
    }
}

impl Debug for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

use PrettyIdx as I;

/// What a mark on a node means depends on the node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// A vertex with surplus edges on this level.
    Vertex,
    /// A tree edge whose level is exactly this level.
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Vertex,
    /// Tree edge node, carrying the id of the edge it represents.
    Edge(usize),
    /// Released edge node, waiting to be reused.
    Free,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Agg {
    /// Number of vertex nodes.
    pub size: usize,
    pub marked_vertices: usize,
    pub marked_edges: usize,
}

impl Agg {
    fn merge(self, right: Self) -> Self {
        Self {
            size: self.size + right.size,
            marked_vertices: self.marked_vertices + right.marked_vertices,
            marked_edges: self.marked_edges + right.marked_edges,
        }
    }
    pub fn marked(&self, mark: Mark) -> usize {
        match mark {
            Mark::Vertex => self.marked_vertices,
            Mark::Edge => self.marked_edges,
        }
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
struct Node {
    kind: NodeKind,
    /// Parent in the heavy splay tree.
    #[derivative(Debug(format_with = "node_fmt"))]
    parent: Idx,
    /// Left and right child in the heavy splay tree
    #[derivative(Debug(format_with = "node2_fmt"))]
    child: [Idx; 2],
    /// This nodes heavy children should be swapped.
    flip_subtree: bool,
    /// Root of the light splay tree of paths hanging from this node.
    #[derivative(Debug(format_with = "node_fmt"))]
    light: Idx,
    /// Only set on roots of heavy splay trees. Parent in the light splay tree, or the node
    /// owning the light tree if this is its root.
    #[derivative(Debug(format_with = "node_fmt"))]
    light_parent: Idx,
    #[derivative(Debug(format_with = "node2_fmt"))]
    light_child: [Idx; 2],
    marked: bool,
    /// Heavy subtree, including everything hanging from it.
    agg: Agg,
    /// Light subtree, meaningful on roots of heavy splay trees.
    #[derivative(Debug = "ignore")]
    light_agg: Agg,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        let mut node = Self {
            kind,
            parent: TopTree::EMPTY,
            child: [TopTree::EMPTY; 2],
            flip_subtree: false,
            light: TopTree::EMPTY,
            light_parent: TopTree::EMPTY,
            light_child: [TopTree::EMPTY; 2],
            marked: false,
            agg: Agg::default(),
            light_agg: Agg::default(),
        };
        node.agg = node.own_agg();
        node.light_agg = node.agg;
        node
    }
    fn own_agg(&self) -> Agg {
        match self.kind {
            NodeKind::Vertex => Agg {
                size: 1,
                marked_vertices: self.marked.into(),
                marked_edges: 0,
            },
            NodeKind::Edge(_) => Agg {
                size: 0,
                marked_vertices: 0,
                marked_edges: self.marked.into(),
            },
            NodeKind::Free => Agg::default(),
        }
    }
    fn has_mark(&self, mark: Mark) -> bool {
        self.marked
            && matches!(
                (mark, self.kind),
                (Mark::Vertex, NodeKind::Vertex) | (Mark::Edge, NodeKind::Edge(_))
            )
    }
    fn is_isolated(&self) -> bool {
        self.parent == TopTree::EMPTY
            && self.child == [TopTree::EMPTY; 2]
            && self.light == TopTree::EMPTY
            && self.light_parent == TopTree::EMPTY
    }
}

/// Forest of unrooted trees over vertices `0..n`, plus edge nodes allocated on demand.
pub struct TopTree {
    nodes: Vec<Node>,
    vertices: usize,
    free: Vec<Idx>,
    /// Scratch space for pushing flips down before a splay.
    path: Vec<Idx>,
}

impl Debug for TopTree {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        let _b = builder.add_branch("TopTree");
        for u in 0..self.nodes.len() {
            let nu = &self.nodes[u];
            if nu.kind != NodeKind::Free
                && nu.parent == Self::EMPTY
                && nu.light_parent == Self::EMPTY
            {
                self.tree_dbg(u, &builder);
            }
        }
        writeln!(f, "{}", builder.string())
    }
}

impl TopTree {
    /// Returned when the node doesn't exist.
    pub const EMPTY: Idx = usize::MAX;

    /// New forest with `n` isolated vertices, which are the nodes `0..n`.
    pub fn new(n: usize) -> Self {
        Self {
            nodes: (0..n).map(|_| Node::new(NodeKind::Vertex)).collect(),
            vertices: n,
            free: Vec::new(),
            path: Vec::new(),
        }
    }

    fn tree_dbg<T: AsTree>(&self, u: Idx, tree: &T) {
        let nu = &self.nodes[u];
        add_branch_to!(*tree, "[{u}] {nu:?}");
        for c in nu.child {
            if c != Self::EMPTY {
                self.tree_dbg(c, tree);
            } else {
                add_leaf_to!(*tree, "<no child>");
            }
        }
        self.light_dbg(nu.light, tree);
    }
    fn light_dbg<T: AsTree>(&self, y: Idx, tree: &T) {
        if y == Self::EMPTY {
            return;
        }
        add_branch_to!(*tree, "light {y}");
        self.tree_dbg(y, tree);
        for c in self.nodes[y].light_child {
            self.light_dbg(c, tree);
        }
    }

    /// Number of vertex nodes.
    pub fn num_vertices(&self) -> usize {
        self.vertices
    }

    pub fn kind(&self, u: Idx) -> NodeKind {
        self.nodes[u].kind
    }

    /// Edge id carried by an edge node.
    pub fn edge_of(&self, u: Idx) -> Option<usize> {
        match self.kind(u) {
            NodeKind::Edge(id) => Some(id),
            _ => None,
        }
    }

    /// Creates an isolated edge node for the given edge id.
    pub fn new_edge_node(&mut self, edge: usize) -> Idx {
        let node = Node::new(NodeKind::Edge(edge));
        match self.free.pop() {
            Some(u) => {
                self.nodes[u] = node;
                u
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Returns an edge node to the arena. It must have been cut from both endpoints.
    pub fn release_edge_node(&mut self, u: Idx) {
        assert!(
            matches!(self.kind(u), NodeKind::Edge(_)),
            "{} is not an edge node",
            I(u)
        );
        if !self.nodes[u].is_isolated() {
            alg_panic()
        }
        self.nodes[u] = Node::new(NodeKind::Free);
        self.free.push(u);
    }

    fn n(&self, u: Idx) -> Option<&Node> {
        if u == Self::EMPTY {
            None
        } else {
            Some(&self.nodes[u])
        }
    }
    fn agg(&self, u: Idx) -> Agg {
        self.n(u).map_or_else(Agg::default, |n| n.agg)
    }
    fn light_agg(&self, u: Idx) -> Agg {
        self.n(u).map_or_else(Agg::default, |n| n.light_agg)
    }
    // Call when heavy children or the light tree root change.
    fn recalc(&mut self, u: Idx) {
        let n = &self.nodes[u];
        let ag = self
            .agg(n.child[0])
            .merge(n.own_agg())
            .merge(self.agg(n.child[1]))
            .merge(self.light_agg(n.light));
        self.nodes[u].agg = ag;
    }
    // Call when light children or the heavy aggregate of a light tree member change.
    fn recalc_light(&mut self, u: Idx) {
        let n = &self.nodes[u];
        let ag = self
            .light_agg(n.light_child[0])
            .merge(n.agg)
            .merge(self.light_agg(n.light_child[1]));
        self.nodes[u].light_agg = ag;
    }
    fn unlaze_flip(&mut self, u: Idx) {
        if !self.nodes[u].flip_subtree {
            return;
        }
        let n = &mut self.nodes[u];
        n.flip_subtree = false;
        n.child.swap(0, 1);
        let child = n.child;
        for c in child {
            if c != Self::EMPTY {
                self.nodes[c].flip_subtree ^= true;
            }
        }
    }

    // HEAVY SPLAY TREES

    fn dir(&self, u: Idx) -> usize {
        (self.nodes[self.nodes[u].parent].child[1] == u).into()
    }
    fn rotate(&mut self, x: Idx) {
        let p = self.nodes[x].parent;
        let g = self.nodes[p].parent;
        let d = self.dir(x);
        let b = self.nodes[x].child[d ^ 1];
        self.nodes[p].child[d] = b;
        if b != Self::EMPTY {
            self.nodes[b].parent = p;
        }
        if g != Self::EMPTY {
            let gd = self.dir(p);
            self.nodes[g].child[gd] = x;
        }
        self.nodes[x].child[d ^ 1] = p;
        self.nodes[p].parent = x;
        self.nodes[x].parent = g;
        self.recalc(p);
        self.recalc(x);
    }
    /// Brings x to the root of its heavy splay tree. x also takes over the place the old root
    /// had in a light tree.
    fn splay(&mut self, x: Idx) {
        let mut top = x;
        self.path.clear();
        self.path.push(x);
        while self.nodes[top].parent != Self::EMPTY {
            top = self.nodes[top].parent;
            self.path.push(top);
        }
        while let Some(u) = self.path.pop() {
            self.unlaze_flip(u);
        }
        while self.nodes[x].parent != Self::EMPTY {
            let p = self.nodes[x].parent;
            if self.nodes[p].parent != Self::EMPTY {
                if self.dir(x) == self.dir(p) {
                    self.rotate(p);
                } else {
                    self.rotate(x);
                }
            }
            self.rotate(x);
        }
        if top != x {
            self.take_light_slot(top, x);
        }
    }
    fn take_light_slot(&mut self, old: Idx, new: Idx) {
        let owner = std::mem::replace(&mut self.nodes[old].light_parent, Self::EMPTY);
        let light_child = std::mem::replace(&mut self.nodes[old].light_child, [Self::EMPTY; 2]);
        self.nodes[new].light_parent = owner;
        self.nodes[new].light_child = light_child;
        for c in light_child {
            if c != Self::EMPTY {
                self.nodes[c].light_parent = new;
            }
        }
        if owner != Self::EMPTY {
            self.replace_light_link(owner, old, new);
        }
        self.recalc_light(new);
    }

    // LIGHT SPLAY TREES
    // Members are roots of heavy splay trees, in no particular order.

    fn replace_light_link(&mut self, p: Idx, old: Idx, new: Idx) {
        let n = &mut self.nodes[p];
        if n.light == old {
            n.light = new;
        } else if n.light_child[0] == old {
            n.light_child[0] = new;
        } else if n.light_child[1] == old {
            n.light_child[1] = new;
        } else {
            alg_panic()
        }
    }
    fn is_light_root(&self, u: Idx) -> bool {
        let p = self.nodes[u].light_parent;
        p == Self::EMPTY || self.nodes[p].light == u
    }
    fn light_dir(&self, u: Idx) -> usize {
        (self.nodes[self.nodes[u].light_parent].light_child[1] == u).into()
    }
    fn light_rotate(&mut self, x: Idx) {
        let p = self.nodes[x].light_parent;
        let g = self.nodes[p].light_parent;
        let d = self.light_dir(x);
        let b = self.nodes[x].light_child[d ^ 1];
        self.nodes[p].light_child[d] = b;
        if b != Self::EMPTY {
            self.nodes[b].light_parent = p;
        }
        self.replace_light_link(g, p, x);
        self.nodes[x].light_child[d ^ 1] = p;
        self.nodes[p].light_parent = x;
        self.nodes[x].light_parent = g;
        self.recalc_light(p);
        self.recalc_light(x);
    }
    fn light_splay(&mut self, x: Idx) {
        while !self.is_light_root(x) {
            let p = self.nodes[x].light_parent;
            if !self.is_light_root(p) {
                if self.light_dir(x) == self.light_dir(p) {
                    self.light_rotate(p);
                } else {
                    self.light_rotate(x);
                }
            }
            self.light_rotate(x);
        }
    }
    /// Adds the heavy root y to the light tree of owner. Doesn't recalc owner.
    fn light_insert(&mut self, owner: Idx, y: Idx) {
        debug_assert_eq!(self.nodes[y].parent, Self::EMPTY);
        debug_assert_eq!(self.nodes[y].light_parent, Self::EMPTY);
        let old = self.nodes[owner].light;
        self.nodes[y].light_child = [old, Self::EMPTY];
        self.nodes[y].light_parent = owner;
        if old != Self::EMPTY {
            self.nodes[old].light_parent = y;
        }
        self.nodes[owner].light = y;
        self.recalc_light(y);
    }
    /// Removes y from the light tree of owner. Doesn't recalc owner.
    fn light_remove(&mut self, owner: Idx, y: Idx) {
        self.light_splay(y);
        if self.nodes[owner].light != y {
            alg_panic()
        }
        let [l, r] = std::mem::replace(&mut self.nodes[y].light_child, [Self::EMPTY; 2]);
        self.nodes[y].light_parent = Self::EMPTY;
        let root = if l == Self::EMPTY {
            r
        } else if r == Self::EMPTY {
            l
        } else {
            // Splay the last node on the left side, then hang the right side from it.
            self.nodes[l].light_parent = owner;
            self.nodes[owner].light = l;
            let mut m = l;
            while self.nodes[m].light_child[1] != Self::EMPTY {
                m = self.nodes[m].light_child[1];
            }
            self.light_splay(m);
            self.nodes[m].light_child[1] = r;
            self.nodes[r].light_parent = m;
            self.recalc_light(m);
            m
        };
        self.nodes[owner].light = root;
        if root != Self::EMPTY {
            self.nodes[root].light_parent = owner;
        }
    }
    /// Node whose light tree contains the heavy splay tree rooted at z.
    fn path_parent(&mut self, z: Idx) -> Idx {
        self.light_splay(z);
        self.nodes[z].light_parent
    }

    // OPERATIONS
    // They panic if the node doesn't exist.

    /// Puts the path from the root of the tree to v on a single heavy splay tree, rooted at
    /// v, with nothing below v. Returns where the exposed path joined the previously exposed
    /// path of the tree.
    pub fn expose(&mut self, v: Idx) -> Idx {
        let mut last = Self::EMPTY;
        let mut z = v;
        while z != Self::EMPTY {
            self.splay(z);
            if last != Self::EMPTY {
                self.light_remove(z, last);
            }
            let below = self.nodes[z].child[1];
            if below != Self::EMPTY {
                self.nodes[below].parent = Self::EMPTY;
                self.light_insert(z, below);
            }
            self.nodes[z].child[1] = last;
            if last != Self::EMPTY {
                self.nodes[last].parent = z;
            }
            self.recalc(z);
            last = z;
            z = self.path_parent(z);
        }
        self.splay(v);
        last
    }

    /// Makes v the root of its tree.
    pub fn evert(&mut self, v: Idx) {
        self.expose(v);
        self.nodes[v].flip_subtree ^= true;
    }

    /// Returns the root of the tree containing v.
    pub fn find_root(&mut self, v: Idx) -> Idx {
        self.expose(v);
        let mut r = v;
        loop {
            self.unlaze_flip(r);
            let l = self.nodes[r].child[0];
            if l == Self::EMPTY {
                break;
            }
            r = l;
        }
        self.splay(r);
        r
    }

    /// Are the two nodes on the same tree?
    pub fn same(&mut self, u: Idx, v: Idx) -> bool {
        u == v || self.find_root(u) == self.find_root(v)
    }

    /// Number of vertices in the tree containing v.
    pub fn size(&mut self, v: Idx) -> usize {
        self.expose(v);
        self.nodes[v].agg.size
    }

    /// Aggregated data of the tree containing v.
    pub fn tree_agg(&mut self, v: Idx) -> Agg {
        self.expose(v);
        self.nodes[v].agg
    }

    // child_root must be the root of its tree and have been exposed last in it.
    fn hang(&mut self, child_root: Idx, parent: Idx) {
        self.expose(parent);
        self.light_insert(parent, child_root);
        self.recalc(parent);
    }

    /// Joins the trees of s and t through the isolated edge node e.
    /// Panics if s and t are already on the same tree.
    pub fn link(&mut self, e: Idx, s: Idx, t: Idx) {
        assert!(!self.same(s, t), "{s} and {t} are already connected");
        if !self.nodes[e].is_isolated() {
            alg_panic()
        }
        log::trace!("link {} between {s} and {t}", I(e));
        self.evert(s);
        self.hang(s, e);
        self.hang(e, t);
    }

    // Removes the tree edge between the adjacent nodes a and b.
    fn detach(&mut self, a: Idx, b: Idx) {
        self.evert(a);
        self.expose(b);
        // The exposed path is exactly a, b.
        if self.nodes[b].child[0] != a || self.nodes[a].child != [Self::EMPTY; 2] {
            alg_panic()
        }
        self.nodes[b].child[0] = Self::EMPTY;
        self.nodes[a].parent = Self::EMPTY;
        self.recalc(b);
    }

    /// Removes the edge node e that links s and t. Returns whether s and t got disconnected,
    /// which on a forest is always the case.
    pub fn cut(&mut self, e: Idx, s: Idx, t: Idx) -> bool {
        log::trace!("cut {} between {s} and {t}", I(e));
        self.detach(e, s);
        self.detach(e, t);
        !self.same(s, t)
    }

    pub fn is_marked(&self, u: Idx) -> bool {
        self.nodes[u].marked
    }

    /// Marks or unmarks u. Vertex marks are counted as `Mark::Vertex`, edge marks as
    /// `Mark::Edge`.
    pub fn set_marked(&mut self, u: Idx, marked: bool) {
        if self.nodes[u].marked == marked {
            return;
        }
        self.expose(u);
        self.nodes[u].marked = marked;
        self.recalc(u);
    }

    /// Some node with the given mark on the tree containing v.
    pub fn find_marked(&mut self, v: Idx, mark: Mark) -> Option<Idx> {
        self.expose(v);
        if self.nodes[v].agg.marked(mark) == 0 {
            return None;
        }
        let mut x = v;
        loop {
            self.unlaze_flip(x);
            let [l, r] = self.nodes[x].child;
            if self.agg(l).marked(mark) > 0 {
                x = l;
                continue;
            }
            if self.nodes[x].has_mark(mark) {
                break;
            }
            if self.agg(r).marked(mark) > 0 {
                x = r;
                continue;
            }
            let mut y = self.nodes[x].light;
            loop {
                if y == Self::EMPTY {
                    alg_panic()
                }
                let [a, b] = self.nodes[y].light_child;
                if self.light_agg(a).marked(mark) > 0 {
                    y = a;
                } else if self.nodes[y].agg.marked(mark) > 0 {
                    break;
                } else {
                    y = b;
                }
            }
            x = y;
        }
        // Pays for the descent.
        self.expose(x);
        Some(x)
    }

    /// All nodes with the given mark on the tree containing v, each once. Their marks are
    /// cleared.
    pub fn enumerate_marked(&mut self, v: Idx, mark: Mark) -> Vec<Idx> {
        let mut found = vec![];
        while let Some(x) = self.find_marked(v, mark) {
            self.set_marked(x, false);
            found.push(x);
        }
        found
    }
}
