//! Neighbor query results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single neighbor: point index and its distance from the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Row of the neighbor in the indexed point set.
    pub index: usize,
    /// Distance in the index metric.
    pub distance: f32,
}

impl Neighbor {
    /// Creates a neighbor entry.
    #[must_use]
    pub fn new(index: usize, distance: f32) -> Self {
        Self { index, distance }
    }
}

/// Total order used by every query: distance first, then index.
#[inline]
pub(crate) fn neighbor_order(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.index.cmp(&b.index))
}

/// Heap entry ordered by [`neighbor_order`]; the max-heap top is the worst kept.
#[derive(Debug, Clone, Copy)]
struct Candidate(Neighbor);

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        neighbor_order(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        neighbor_order(&self.0, &other.0)
    }
}

/// Bounded collection of the best `capacity` neighbors seen so far.
#[derive(Debug)]
pub(crate) struct CandidateHeap {
    capacity: usize,
    heap: BinaryHeap<Candidate>,
}

impl CandidateHeap {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    pub(crate) fn push(&mut self, neighbor: Neighbor) {
        if self.heap.len() < self.capacity {
            self.heap.push(Candidate(neighbor));
        } else if let Some(worst) = self.heap.peek() {
            if neighbor_order(&neighbor, &worst.0) == Ordering::Less {
                self.heap.pop();
                self.heap.push(Candidate(neighbor));
            }
        }
    }

    /// Whether a region whose distance lower bound is `bound` may still hold
    /// a better candidate. Equal bounds are admitted so index tie-breaks hold.
    pub(crate) fn admits(&self, bound: f32) -> bool {
        if self.heap.len() < self.capacity {
            return true;
        }
        self.heap
            .peek()
            .is_some_and(|worst| bound <= worst.0.distance)
    }

    pub(crate) fn into_sorted(self) -> Vec<Neighbor> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|candidate| candidate.0)
            .collect()
    }
}

/// k nearest neighbors of every indexed point, self excluded.
///
/// Rows are stored row-major; row `i` lists the neighbors of point `i` by
/// increasing `(distance, index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnTable {
    k: usize,
    indices: Vec<usize>,
    distances: Vec<f32>,
}

impl KnnTable {
    /// Builds a table from raw row-major arrays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the arrays differ in length, are not a
    /// multiple of `k`, or reference a point outside the table.
    pub fn from_parts(k: usize, indices: Vec<usize>, distances: Vec<f32>) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidData("k-NN table needs k >= 1".to_string()));
        }
        if indices.len() != distances.len() || indices.len() % k != 0 {
            return Err(Error::InvalidData(format!(
                "k-NN arrays of length {} and {} do not form rows of {k}",
                indices.len(),
                distances.len()
            )));
        }
        let points = indices.len() / k;
        if let Some(bad) = indices.iter().find(|&&j| j >= points) {
            return Err(Error::InvalidData(format!(
                "neighbor {bad} out of range for {points} points"
            )));
        }
        Ok(Self {
            k,
            indices,
            distances,
        })
    }

    pub(crate) fn from_rows(k: usize, rows: Vec<Vec<Neighbor>>) -> Self {
        let mut indices = Vec::with_capacity(rows.len() * k);
        let mut distances = Vec::with_capacity(rows.len() * k);
        for row in rows {
            debug_assert_eq!(row.len(), k);
            for neighbor in row {
                indices.push(neighbor.index);
                distances.push(neighbor.distance);
            }
        }
        Self {
            k,
            indices,
            distances,
        }
    }

    /// Neighbors per point.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of points (rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len() / self.k
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Neighbor indices of point `i`.
    #[must_use]
    pub fn indices(&self, i: usize) -> &[usize] {
        &self.indices[i * self.k..(i + 1) * self.k]
    }

    /// Neighbor distances of point `i`.
    #[must_use]
    pub fn distances(&self, i: usize) -> &[f32] {
        &self.distances[i * self.k..(i + 1) * self.k]
    }

    /// The `slot`-th (0-based) neighbor of point `i`.
    #[must_use]
    pub fn neighbor(&self, i: usize, slot: usize) -> usize {
        self.indices[i * self.k + slot]
    }

    /// Distance from point `i` to its `slot`-th (0-based) neighbor.
    #[must_use]
    pub fn distance(&self, i: usize, slot: usize) -> f32 {
        self.distances[i * self.k + slot]
    }

    /// Iterates over the neighbors of point `i`.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = Neighbor> + '_ {
        self.indices(i)
            .iter()
            .zip(self.distances(i))
            .map(|(&index, &distance)| Neighbor { index, distance })
    }

    /// Whether `j` is among the k nearest neighbors of `i`.
    #[must_use]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.indices(i).contains(&j)
    }
}
