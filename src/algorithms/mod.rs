//! Graph algorithms (lazy shortest-path walk, reference BFS)
//!
//! `walk` discovers edges on demand through a neighbor source; `traversal` runs
//! over a materialized CSR graph and is used to check the walk.

pub mod traversal;
pub mod walk;

pub use traversal::{bfs, bfs_distance};
pub use walk::{walk, ExpandEvent, WalkConfig, WalkStats, Walker};
