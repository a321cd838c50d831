//! Edge-set derivation from neighbor query results.
//!
//! Four topologies turn per-point neighbor lists into a weighted edge list:
//!
//! | Topology | Keeps | Deduplication |
//! |----------|-------|---------------|
//! | `Directed` | every (i, j) with j in kNN(i) | none, N·k edges |
//! | `Mutual` | j in kNN(i) **and** i in kNN(j) | one edge per pair |
//! | `Symmetric` | j in kNN(i) **or** i in kNN(j) | one edge per unordered pair |
//! | `Radius` | every (i, j) with d(i, j) <= r | none |
//!
//! When a pair is produced from both directions, the surviving weight is the
//! one computed from the endpoint with the smaller index. Rows are evaluated
//! in parallel but merged in row order, so results never depend on
//! scheduling.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::{KnnTable, Neighbor, NeighborIndex};
use crate::kernel::SimilarityKernel;
use crate::util::map_rows;

/// Neighborhood structure of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Directed k-NN graph.
    Directed {
        /// Neighbors per point.
        k: usize,
    },
    /// Mutual k-NN graph.
    Mutual {
        /// Neighbors per point.
        k: usize,
    },
    /// Symmetric (union) k-NN graph.
    Symmetric {
        /// Neighbors per point.
        k: usize,
    },
    /// Fixed-radius neighborhood graph.
    Radius {
        /// Radius in the index metric.
        radius: f32,
    },
}

impl Topology {
    /// Neighbor count for k-NN topologies.
    #[must_use]
    pub fn k(&self) -> Option<usize> {
        match *self {
            Self::Directed { k } | Self::Mutual { k } | Self::Symmetric { k } => Some(k),
            Self::Radius { .. } => None,
        }
    }

    /// Whether the assembled graph is directed.
    ///
    /// Radius graphs emit one edge per query direction and are stored directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        matches!(self, Self::Directed { .. } | Self::Radius { .. })
    }

    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Directed { .. } => "directed",
            Self::Mutual { .. } => "mutual",
            Self::Symmetric { .. } => "symmetric",
            Self::Radius { .. } => "radius",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directed { k } | Self::Mutual { k } | Self::Symmetric { k } => {
                write!(f, "{} k-NN (k={k})", self.name())
            }
            Self::Radius { radius } => write!(f, "radius (r={radius})"),
        }
    }
}

/// Raw neighbor query results for every point.
#[derive(Debug, Clone, PartialEq)]
pub enum NeighborQuery {
    /// k nearest neighbors of each point.
    Knn(KnnTable),
    /// All points within the radius of each point.
    Radius(Vec<Vec<Neighbor>>),
}

impl NeighborQuery {
    /// Runs the query a topology needs against `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidK`] for a k-NN topology with `k` outside
    /// `1..index.len()`.
    pub fn run(index: &NeighborIndex, topology: Topology) -> Result<Self> {
        match topology {
            Topology::Radius { radius } => Ok(Self::Radius(index.radius_all(radius))),
            Topology::Directed { k } | Topology::Mutual { k } | Topology::Symmetric { k } => {
                Ok(Self::Knn(index.query_knn(k)?))
            }
        }
    }

    /// The k-NN table, if this is a k-NN query.
    #[must_use]
    pub fn knn(&self) -> Option<&KnnTable> {
        match self {
            Self::Knn(table) => Some(table),
            Self::Radius(_) => None,
        }
    }
}

/// Edge list with index-aligned weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeList {
    edges: Vec<(usize, usize)>,
    weights: Vec<f32>,
}

impl EdgeList {
    /// Creates an empty edge list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an edge list from parallel arrays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the arrays differ in length.
    pub fn from_parts(edges: Vec<(usize, usize)>, weights: Vec<f32>) -> Result<Self> {
        if edges.len() != weights.len() {
            return Err(Error::InvalidData(format!(
                "{} edges but {} weights",
                edges.len(),
                weights.len()
            )));
        }
        Ok(Self { edges, weights })
    }

    /// Appends an edge.
    pub fn push(&mut self, source: usize, target: usize, weight: f32) {
        self.edges.push((source, target));
        self.weights.push(weight);
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if there are no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Endpoints, in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Weights, aligned with [`EdgeList::edges`].
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Iterates over `(source, target, weight)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.edges
            .iter()
            .zip(&self.weights)
            .map(|(&(s, t), &w)| (s, t, w))
    }

    /// Edges as unordered pairs `(min, max)`.
    #[must_use]
    pub fn unordered_pairs(&self) -> HashSet<(usize, usize)> {
        self.edges.iter().map(|&(s, t)| unordered(s, t)).collect()
    }

    /// Splits into edge and weight arrays.
    #[must_use]
    pub fn into_parts(self) -> (Vec<(usize, usize)>, Vec<f32>) {
        (self.edges, self.weights)
    }
}

#[inline]
fn unordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Derives weighted edge lists from neighbor query results.
#[derive(Debug, Clone, Copy)]
pub struct NeighborhoodBuilder {
    kernel: SimilarityKernel,
    parallel: bool,
}

impl NeighborhoodBuilder {
    /// Creates a builder weighting edges with `kernel`.
    #[must_use]
    pub fn new(kernel: SimilarityKernel) -> Self {
        Self {
            kernel,
            parallel: true,
        }
    }

    /// Enables or disables parallel kernel evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The kernel weighting every edge.
    #[must_use]
    pub fn kernel(&self) -> SimilarityKernel {
        self.kernel
    }

    /// Builds the edge list of `topology` from matching query results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the query kind does not match the
    /// topology, or any kernel error.
    pub fn build(&self, topology: Topology, query: &NeighborQuery) -> Result<EdgeList> {
        match (topology, query) {
            (Topology::Directed { .. }, NeighborQuery::Knn(table)) => self.directed(table),
            (Topology::Mutual { .. }, NeighborQuery::Knn(table)) => self.mutual(table),
            (Topology::Symmetric { .. }, NeighborQuery::Knn(table)) => self.symmetric(table),
            (Topology::Radius { .. }, NeighborQuery::Radius(results)) => self.radius(results),
            (topology, _) => Err(Error::InvalidData(format!(
                "{} topology does not match the neighbor query results",
                topology.name()
            ))),
        }
    }

    /// Directed k-NN: every (i, j) with j among i's k nearest neighbors.
    ///
    /// # Errors
    ///
    /// Returns any kernel error.
    pub fn directed(&self, table: &KnnTable) -> Result<EdgeList> {
        let weights = self.row_weights(table)?;
        let mut out = EdgeList::new();
        for (i, row) in weights.iter().enumerate() {
            for (slot, &w) in row.iter().enumerate() {
                out.push(i, table.neighbor(i, slot), w);
            }
        }
        Ok(out)
    }

    /// Mutual k-NN: pairs where each endpoint lists the other.
    ///
    /// Each pair is emitted once, as `(i, j)` with `i < j`.
    ///
    /// # Errors
    ///
    /// Returns any kernel error.
    pub fn mutual(&self, table: &KnnTable) -> Result<EdgeList> {
        let weights = self.row_weights(table)?;
        let mut out = EdgeList::new();
        for (i, row) in weights.iter().enumerate() {
            for (slot, &w) in row.iter().enumerate() {
                let j = table.neighbor(i, slot);
                if i < j && table.contains(j, i) {
                    out.push(i, j, w);
                }
            }
        }
        Ok(out)
    }

    /// Symmetric k-NN: union of both directions, one edge per unordered pair.
    ///
    /// # Errors
    ///
    /// Returns any kernel error.
    pub fn symmetric(&self, table: &KnnTable) -> Result<EdgeList> {
        let weights = self.row_weights(table)?;
        let mut unique: IndexMap<(usize, usize), f32> = IndexMap::new();
        for (i, row) in weights.iter().enumerate() {
            for (slot, &w) in row.iter().enumerate() {
                unique
                    .entry(unordered(i, table.neighbor(i, slot)))
                    .or_insert(w);
            }
        }
        Ok(collect_pairs(unique))
    }

    /// Radius graph: every (i, j) returned by i's radius query, heat-weighted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientNeighbors`] unless the kernel is the heat
    /// kernel.
    pub fn radius(&self, results: &[Vec<Neighbor>]) -> Result<EdgeList> {
        let mut out = EdgeList::new();
        for (i, neighbors) in results.iter().enumerate() {
            for neighbor in neighbors {
                let w = self.kernel.radius_weight(i, neighbor.distance)?;
                out.push(i, neighbor.index, w);
            }
        }
        Ok(out)
    }

    /// Completion edges for `spurious` vertices from their k-NN rows.
    ///
    /// Returns only new edges: pairs already in `existing` (as unordered
    /// pairs) and repeats among the new edges are skipped. Each new edge is
    /// oriented from the spurious vertex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for a vertex outside the table, or any
    /// kernel error.
    pub fn completion(
        &self,
        table: &KnnTable,
        spurious: &[usize],
        existing: &EdgeList,
    ) -> Result<EdgeList> {
        self.kernel.check_table(table)?;
        let present = existing.unordered_pairs();
        let mut sources = spurious.to_vec();
        sources.sort_unstable();
        sources.dedup();

        let mut added: IndexMap<(usize, usize), (usize, usize, f32)> = IndexMap::new();
        for &i in &sources {
            if i >= table.len() {
                return Err(Error::InvalidData(format!(
                    "spurious vertex {i} out of range for {} points",
                    table.len()
                )));
            }
            for slot in 0..table.k() {
                let j = table.neighbor(i, slot);
                let key = unordered(i, j);
                if present.contains(&key) || added.contains_key(&key) {
                    continue;
                }
                let w = self.kernel.knn_weight(table, i, slot)?;
                added.insert(key, (i, j, w));
            }
        }

        let mut out = EdgeList::new();
        for (_, (i, j, w)) in added {
            out.push(i, j, w);
        }
        Ok(out)
    }

    fn row_weights(&self, table: &KnnTable) -> Result<Vec<Vec<f32>>> {
        self.kernel.check_table(table)?;
        let kernel = self.kernel;
        map_rows(table.len(), self.parallel, |i| {
            (0..table.k())
                .map(|slot| kernel.knn_weight(table, i, slot))
                .collect::<Result<Vec<f32>>>()
        })
        .into_iter()
        .collect()
    }
}

fn collect_pairs(unique: IndexMap<(usize, usize), f32>) -> EdgeList {
    let mut out = EdgeList::new();
    for ((a, b), w) in unique {
        out.push(a, b, w);
    }
    out
}
