//! Similarity kernels turning a known pairwise distance into an edge weight.
//!
//! Kernels never compute distances themselves: they read the distances
//! already produced by the neighbor query.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::KnnTable;

/// Default heat kernel bandwidth.
pub const DEFAULT_SIGMA: f32 = 0.5;

/// Distance-to-weight transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKernel {
    /// `w = exp(-d / sigma)` with a global bandwidth.
    Heat {
        /// Bandwidth, strictly positive.
        sigma: f32,
    },
    /// `w = exp(-d(i,j) / (sqrt(s_i) * sqrt(s_j)))` where `s_x` is the distance
    /// from `x` to its `rank`-th nearest neighbor (Zelnik-Manor & Perona).
    LocallyScaled {
        /// 1-indexed neighbor rank giving each vertex its local scale.
        rank: usize,
    },
}

impl Default for SimilarityKernel {
    fn default() -> Self {
        Self::Heat {
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl SimilarityKernel {
    /// Heat kernel weight for a distance.
    #[must_use]
    #[inline]
    pub fn heat_weight(distance: f32, sigma: f32) -> f32 {
        (-distance / sigma).exp()
    }

    /// Checks that every row of `table` reaches the local scaling rank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientNeighbors`] for the first point whose row
    /// is shorter than the rank.
    pub fn check_table(&self, table: &KnnTable) -> Result<()> {
        if let Self::LocallyScaled { rank } = *self {
            if rank > table.k() && !table.is_empty() {
                return Err(Error::InsufficientNeighbors {
                    point: 0,
                    rank,
                    available: table.k(),
                });
            }
        }
        Ok(())
    }

    /// Weight of the edge from point `i` to its `slot`-th k-NN neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientNeighbors`] if the local scaling rank
    /// exceeds the neighbors stored per point.
    pub fn knn_weight(&self, table: &KnnTable, i: usize, slot: usize) -> Result<f32> {
        let distance = table.distance(i, slot);
        match *self {
            Self::Heat { sigma } => Ok(Self::heat_weight(distance, sigma)),
            Self::LocallyScaled { rank } => {
                let j = table.neighbor(i, slot);
                let scale_i = local_scale(table, i, rank)?;
                let scale_j = local_scale(table, j, rank)?;
                Ok(locally_scaled_weight(distance, scale_i, scale_j))
            }
        }
    }

    /// Weight of a radius-query edge from point `point`.
    ///
    /// Radius queries retrieve no ranked neighbor distances, so only the heat
    /// kernel applies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientNeighbors`] for the locally-scaled kernel.
    pub fn radius_weight(&self, point: usize, distance: f32) -> Result<f32> {
        match *self {
            Self::Heat { sigma } => Ok(Self::heat_weight(distance, sigma)),
            Self::LocallyScaled { rank } => Err(Error::InsufficientNeighbors {
                point,
                rank,
                available: 0,
            }),
        }
    }
}

impl std::fmt::Display for SimilarityKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heat { sigma } => write!(f, "heat kernel (sigma={sigma})"),
            Self::LocallyScaled { rank } => write!(f, "locally scaled heat kernel (rank={rank})"),
        }
    }
}

fn local_scale(table: &KnnTable, point: usize, rank: usize) -> Result<f32> {
    if rank == 0 || rank > table.k() {
        return Err(Error::InsufficientNeighbors {
            point,
            rank,
            available: table.k(),
        });
    }
    Ok(table.distance(point, rank - 1))
}

fn locally_scaled_weight(distance: f32, scale_i: f32, scale_j: f32) -> f32 {
    let bandwidth = scale_i.sqrt() * scale_j.sqrt();
    if bandwidth > 0.0 {
        (-distance / bandwidth).exp()
    } else if distance == 0.0 {
        // Duplicate points: zero scale and zero distance.
        1.0
    } else {
        0.0
    }
}
