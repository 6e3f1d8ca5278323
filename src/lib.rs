pub mod connectivity;
pub mod levels;
pub mod surplus;
pub mod top_tree;
pub use connectivity::{Connectivity, CutResult, DynamicConnectivity};

fn alg_panic() -> ! {
    panic!("Dynamic connectivity algorithm incorrect")
}
fn or_alg_panic<T>(opt: Option<T>) -> T {
    opt.unwrap_or_else(|| alg_panic())
}
