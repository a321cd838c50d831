//! Nearest-neighbor index.
//!
//! # Module Organization
//!
//! - `params`: Index kind, metric and tuning parameters
//! - `neighbors`: Query result types (`Neighbor`, `KnnTable`)
//! - `kdtree`: Exact kd-tree backend
//! - `brute_force`: Linear-scan backend
//! - `neighbor_index`: `NeighborIndex`, the public entry point

mod brute_force;
mod kdtree;
mod neighbor_index;
mod neighbors;
mod params;


pub use neighbor_index::NeighborIndex;
pub use neighbors::{KnnTable, Neighbor};
pub use params::{IndexKind, IndexParams, DEFAULT_LEAF_SIZE};
