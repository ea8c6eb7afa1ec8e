pub mod datastructures;
pub mod exact;
pub mod graph;
pub mod io;
pub mod logging;
pub mod meta_heuristics;
pub mod solver;
pub mod upperbound;
pub mod util;

pub use datastructures::BitSet;
