//! Graph assembly over a point set.
//!
//! This module provides:
//! - `ProximityGraph`: vertices labeled with their original row, weighted edges
//! - `Component`: weakly-connected components, largest first
//! - `GraphDocument`: plain serializable snapshot of a graph

mod components;
mod document;
mod proximity;


pub use components::Component;
pub use document::GraphDocument;
pub use proximity::{ProximityGraph, Vertex};
