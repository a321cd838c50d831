//! In-memory point matrix.
//!
//! Points are identified solely by their row position. A `PointSet` is never
//! mutated: filtering produces a new set.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An N×D matrix of `f32` coordinates stored row-major.
///
/// Invariant: `len >= 1`, `dimension >= 1` and every row has `dimension` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    data: Vec<f32>,
    dimension: usize,
}

impl PointSet {
    /// Creates a point set from individual rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexBuild`] if there are no rows, the rows have zero
    /// dimensions, or the rows are ragged.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::IndexBuild("point matrix is empty".to_string()));
        };
        let dimension = first.as_ref().len();
        if dimension == 0 {
            return Err(Error::IndexBuild(
                "points must have at least one dimension".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(rows.len() * dimension);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != dimension {
                return Err(Error::IndexBuild(format!(
                    "ragged point matrix: row {row} has {} values, expected {dimension}",
                    values.len()
                )));
            }
            data.extend_from_slice(values);
        }

        Ok(Self { data, dimension })
    }

    /// Creates a point set from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexBuild`] if the buffer is empty, `dimension` is 0,
    /// or the buffer length is not a multiple of `dimension`.
    pub fn from_flat(data: Vec<f32>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::IndexBuild(
                "points must have at least one dimension".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(Error::IndexBuild("point matrix is empty".to_string()));
        }
        if data.len() % dimension != 0 {
            return Err(Error::IndexBuild(format!(
                "buffer of {} values is not a multiple of dimension {dimension}",
                data.len()
            )));
        }
        Ok(Self { data, dimension })
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dimensionality D of every point.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Coordinates of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    #[inline]
    pub fn point(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dimension)
    }

    /// Flat row-major view of the coordinates.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Builds a new point set keeping only `rows`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexBuild`] if `rows` is empty, or
    /// [`Error::InvalidData`] if a row is out of range.
    pub fn select(&self, rows: &[usize]) -> Result<Self> {
        let len = self.len();
        let mut data = Vec::with_capacity(rows.len() * self.dimension);
        for &row in rows {
            if row >= len {
                return Err(Error::InvalidData(format!(
                    "row {row} out of range for {len} points"
                )));
            }
            data.extend_from_slice(self.point(row));
        }
        Self::from_flat(data, self.dimension)
    }

    /// Builds a new point set without the given rows.
    ///
    /// Returns the filtered set together with the surviving row numbers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexBuild`] if every row is removed.
    pub fn without(&self, removed: &[usize]) -> Result<(Self, Vec<usize>)> {
        let mut drop = vec![false; self.len()];
        for &row in removed {
            if let Some(flag) = drop.get_mut(row) {
                *flag = true;
            }
        }
        let kept: Vec<usize> = (0..self.len()).filter(|&row| !drop[row]).collect();
        let filtered = self.select(&kept)?;
        Ok((filtered, kept))
    }
}
