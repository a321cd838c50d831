//! Neighbor index parameters.

use crate::distance::DistanceMetric;
use serde::{Deserialize, Serialize};

/// Default maximum number of points in a kd-tree leaf.
pub const DEFAULT_LEAF_SIZE: usize = 16;

/// Search structure backing a [`NeighborIndex`](super::NeighborIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Exact kd-tree (default). Best for low and medium dimensions.
    #[default]
    #[serde(rename = "kdtree")]
    KdTree,
    /// Linear scan over every point. Exact, O(N) per query.
    BruteForce,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KdTree => write!(f, "kdtree"),
            Self::BruteForce => write!(f, "brute_force"),
        }
    }
}

/// Neighbor index parameters.
///
/// Both index kinds are exact and order neighbors by `(distance, index)`, so
/// switching `kind` or `parallel` never changes query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexParams {
    /// Search structure.
    pub kind: IndexKind,
    /// Maximum kd-tree leaf size.
    pub leaf_size: usize,
    /// Distance metric for every query.
    pub metric: DistanceMetric,
    /// Run bulk queries on the rayon thread pool.
    pub parallel: bool,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            kind: IndexKind::KdTree,
            leaf_size: DEFAULT_LEAF_SIZE,
            metric: DistanceMetric::SquaredEuclidean,
            parallel: true,
        }
    }
}

impl IndexParams {
    /// Parameters for a brute-force index.
    #[must_use]
    pub fn brute_force() -> Self {
        Self {
            kind: IndexKind::BruteForce,
            ..Self::default()
        }
    }

    /// Sets the distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the kd-tree leaf size.
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Enables or disables parallel bulk queries.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
