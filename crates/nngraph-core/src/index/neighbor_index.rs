//! The queryable neighbor index.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::brute_force;
use super::kdtree::KdTree;
use super::neighbors::{neighbor_order, CandidateHeap, KnnTable, Neighbor};
use super::params::{IndexKind, IndexParams};
use crate::error::{Error, Result};
use crate::point_set::PointSet;
use crate::util::map_rows;

/// Nearest-neighbor index over a [`PointSet`].
///
/// The index owns its points and is immutable once built. Filtering the point
/// set means building a new index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborIndex {
    points: PointSet,
    params: IndexParams,
    tree: Option<KdTree>,
}

impl NeighborIndex {
    /// Builds an index over `points`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexBuild`] if `params.leaf_size` is 0.
    pub fn build(points: PointSet, params: IndexParams) -> Result<Self> {
        if params.leaf_size == 0 {
            return Err(Error::IndexBuild("leaf_size must be at least 1".to_string()));
        }
        let tree = match params.kind {
            IndexKind::KdTree => Some(KdTree::build(&points, params.leaf_size)),
            IndexKind::BruteForce => None,
        };
        Ok(Self {
            points,
            params,
            tree,
        })
    }

    /// Builds an index from raw rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexBuild`] if `rows` is empty or ragged.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R], params: IndexParams) -> Result<Self> {
        Self::build(PointSet::from_rows(rows)?, params)
    }

    /// Indexed points.
    #[must_use]
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Consumes the index, returning its points.
    #[must_use]
    pub fn into_points(self) -> PointSet {
        self.points
    }

    /// Index parameters.
    #[must_use]
    pub fn params(&self) -> &IndexParams {
        &self.params
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a point set has at least one point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimension of the indexed points.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.points.dimension()
    }

    /// k nearest neighbors of every indexed point, excluding the point itself.
    ///
    /// Internally requests `k + 1` neighbors and drops the self-match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidK`] unless `1 <= k < len()`.
    pub fn query_knn(&self, k: usize) -> Result<KnnTable> {
        let n = self.len();
        if k < 1 || k >= n {
            return Err(Error::InvalidK { k, points: n });
        }

        let rows = map_rows(n, self.params.parallel, |row| {
            let mut neighbors = self.collect_knn(self.points.point(row), k + 1);
            match neighbors.iter().position(|nb| nb.index == row) {
                Some(pos) => {
                    neighbors.remove(pos);
                }
                // More than k duplicates of `row` sorted ahead of it.
                None => {
                    neighbors.pop();
                }
            }
            neighbors
        });

        Ok(KnnTable::from_rows(k, rows))
    }

    /// All other indexed points within `radius` of point `point`.
    ///
    /// An empty result (isolated point) is not an error. Results are sorted by
    /// `(distance, index)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if `point` is out of range.
    pub fn query_radius(&self, point: usize, radius: f32) -> Result<Vec<Neighbor>> {
        if point >= self.len() {
            return Err(Error::InvalidData(format!(
                "point {point} out of range for {} points",
                self.len()
            )));
        }
        Ok(self.radius_excluding(point, radius))
    }

    /// Radius query for every indexed point, in row order.
    #[must_use]
    pub fn radius_all(&self, radius: f32) -> Vec<Vec<Neighbor>> {
        map_rows(self.len(), self.params.parallel, |row| {
            self.radius_excluding(row, radius)
        })
    }

    /// k nearest indexed points to an external query vector.
    ///
    /// No self-exclusion is applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] for a wrongly sized query and
    /// [`Error::InvalidK`] unless `1 <= k <= len()`.
    pub fn search_knn(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_query(query)?;
        if k < 1 || k > self.len() {
            return Err(Error::InvalidK {
                k,
                points: self.len(),
            });
        }
        Ok(self.collect_knn(query, k))
    }

    /// Indexed points within `radius` of an external query vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] for a wrongly sized query.
    pub fn search_radius(&self, query: &[f32], radius: f32) -> Result<Vec<Neighbor>> {
        self.check_query(query)?;
        Ok(self.collect_radius(query, radius))
    }

    /// Writes the index with `bincode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or serialization fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Reads an index written by [`NeighborIndex::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid index.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let index: Self = bincode::deserialize_from(reader)?;
        Ok(index)
    }

    fn check_query(&self, query: &[f32]) -> Result<()> {
        if query.len() != self.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }
        Ok(())
    }

    fn collect_knn(&self, query: &[f32], count: usize) -> Vec<Neighbor> {
        let mut heap = CandidateHeap::new(count);
        match &self.tree {
            Some(tree) => tree.knn(&self.points, self.params.metric, query, &mut heap),
            None => brute_force::knn(&self.points, self.params.metric, query, &mut heap),
        }
        heap.into_sorted()
    }

    fn collect_radius(&self, query: &[f32], radius: f32) -> Vec<Neighbor> {
        let mut out = Vec::new();
        match &self.tree {
            Some(tree) => tree.radius(&self.points, self.params.metric, query, radius, &mut out),
            None => brute_force::radius(&self.points, self.params.metric, query, radius, &mut out),
        }
        out.sort_by(neighbor_order);
        out
    }

    fn radius_excluding(&self, row: usize, radius: f32) -> Vec<Neighbor> {
        let mut neighbors = self.collect_radius(self.points.point(row), radius);
        neighbors.retain(|nb| nb.index != row);
        neighbors
    }
}
