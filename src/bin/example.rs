use dynamic_connectivity::{Connectivity, DynamicConnectivity};

fn link(t: &mut impl DynamicConnectivity, u: usize, v: usize) {
    let joined = t.link(u, v);
    println!(
        "Adding edge from {u} to {v}: {}, {} components",
        if joined { "joined two components" } else { "redundant" },
        t.component_count()
    );
}

fn cut(t: &mut impl DynamicConnectivity, u: usize, v: usize) {
    let result = t.cut(u, v);
    println!(
        "Removing edge from {u} to {v}: {result:?}, {} components",
        t.component_count()
    );
}

fn same(t: &mut impl DynamicConnectivity, u: usize, v: usize) {
    println!(
        "Are {u} and {v} connected? {}",
        if t.same(u, v) { "Yes" } else { "No" }
    );
}

fn main() {
    let mut t = Connectivity::new(5);
    link(&mut t, 0, 1);
    link(&mut t, 1, 2);
    link(&mut t, 3, 4);
    link(&mut t, 0, 2);
    same(&mut t, 0, 2);
    cut(&mut t, 1, 2);
    same(&mut t, 1, 2);
    cut(&mut t, 0, 1);
    same(&mut t, 0, 1);
    println!("Component of 2 has {} vertices", t.size(2));
}
