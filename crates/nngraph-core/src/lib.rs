//! # nngraph core
//!
//! Weighted proximity graphs over point sets.
//!
//! Given an N×D point matrix, the crate builds a neighbor index, turns each
//! point's neighbors into weighted edges and checks that the resulting graph
//! is connected, optionally repairing it.
//!
//! ## Features
//!
//! - **Exact neighbor index**: kd-tree or brute force, SIMD squared-L2
//! - **Four topologies**: directed, mutual and symmetric k-NN, fixed radius
//! - **Two kernels**: heat kernel and locally-scaled (self-tuning) kernel
//! - **Connectivity repair**: report, prune to the largest component, or
//!   complete with k-NN edges
//! - **Persistence**: text edge lists, JSON, `bincode`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nngraph_core::{ConnectivityPolicy, GraphConfig, Pipeline, PointSet, Topology};
//!
//! let points = PointSet::from_rows(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [5.0, 5.0]])?;
//!
//! let config = GraphConfig::new(Topology::Symmetric { k: 2 })
//!     .with_policy(ConnectivityPolicy::Complete);
//!
//! let output = Pipeline::new(config)?.run(points)?;
//! println!("{} edges, {} components", output.graph.edge_count(), output.stats.components);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // Acceptable for f32/f64 conversions
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]

pub mod config;
pub mod connectivity;
pub mod distance;
pub mod error;
pub mod graph;
pub mod index;
pub mod kernel;
#[cfg(test)]
mod kernel_tests;
pub mod neighborhood;
#[cfg(test)]
mod neighborhood_tests;
pub mod persistence;
pub mod pipeline;
pub mod point_set;
mod util;

pub use config::{BuildOptions, ConfigError, GraphConfig};
pub use connectivity::{ConnectivityPolicy, ConnectivityRepair, ConnectivityReport, RepairOutcome};
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use graph::{Component, GraphDocument, ProximityGraph};
pub use index::{IndexKind, IndexParams, KnnTable, Neighbor, NeighborIndex};
pub use kernel::SimilarityKernel;
pub use neighborhood::{EdgeList, NeighborQuery, NeighborhoodBuilder, Topology};
pub use persistence::{load_graph, read_points, save_graph, write_points, OutputFormat};
pub use pipeline::{
    NoopObserver, Pipeline, PipelineEvent, PipelineObserver, PipelineOutput, PipelineStats,
    TracingObserver,
};
pub use point_set::PointSet;
