//! Exact kd-tree over a [`PointSet`].
//!
//! Algorithm:
//! - Split on the axis of largest spread at the median point
//! - Stop at `leaf_size` points, or when every point in the node coincides
//! - Descend into the near child first and visit the far child only while the
//!   splitting plane is within the current k-th distance (or the radius)
//!
//! The tree stores row numbers only; coordinates stay in the owning index.

use serde::{Deserialize, Serialize};

use super::neighbors::{CandidateHeap, Neighbor};
use crate::distance::DistanceMetric;
use crate::point_set::PointSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum KdNode {
    /// Rows `order[start..end]`.
    Leaf { start: usize, end: usize },
    /// Left child holds coordinates `<= value` on `axis`, right child `>= value`.
    Split {
        axis: usize,
        value: f32,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct KdTree {
    nodes: Vec<KdNode>,
    order: Vec<usize>,
}

impl KdTree {
    pub(crate) fn build(points: &PointSet, leaf_size: usize) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::new();
        build_node(points, &mut order, 0, leaf_size.max(1), &mut nodes);
        Self { nodes, order }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn knn(
        &self,
        points: &PointSet,
        metric: DistanceMetric,
        query: &[f32],
        heap: &mut CandidateHeap,
    ) {
        self.knn_at(0, points, metric, query, heap);
    }

    fn knn_at(
        &self,
        node: usize,
        points: &PointSet,
        metric: DistanceMetric,
        query: &[f32],
        heap: &mut CandidateHeap,
    ) {
        match self.nodes[node] {
            KdNode::Leaf { start, end } => {
                for &row in &self.order[start..end] {
                    heap.push(Neighbor::new(row, metric.calculate(query, points.point(row))));
                }
            }
            KdNode::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis] - value;
                let (near, far) = if diff <= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.knn_at(near, points, metric, query, heap);
                if heap.admits(metric.axis_bound(diff)) {
                    self.knn_at(far, points, metric, query, heap);
                }
            }
        }
    }

    pub(crate) fn radius(
        &self,
        points: &PointSet,
        metric: DistanceMetric,
        query: &[f32],
        radius: f32,
        out: &mut Vec<Neighbor>,
    ) {
        self.radius_at(0, points, metric, query, radius, out);
    }

    fn radius_at(
        &self,
        node: usize,
        points: &PointSet,
        metric: DistanceMetric,
        query: &[f32],
        radius: f32,
        out: &mut Vec<Neighbor>,
    ) {
        match self.nodes[node] {
            KdNode::Leaf { start, end } => {
                for &row in &self.order[start..end] {
                    let distance = metric.calculate(query, points.point(row));
                    if distance <= radius {
                        out.push(Neighbor::new(row, distance));
                    }
                }
            }
            KdNode::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis] - value;
                let (near, far) = if diff <= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.radius_at(near, points, metric, query, radius, out);
                if metric.axis_bound(diff) <= radius {
                    self.radius_at(far, points, metric, query, radius, out);
                }
            }
        }
    }
}

/// Builds the subtree over `order` (rows starting at `offset` in the final
/// ordering) and returns its node id.
fn build_node(
    points: &PointSet,
    order: &mut [usize],
    offset: usize,
    leaf_size: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let id = nodes.len();
    let leaf = KdNode::Leaf {
        start: offset,
        end: offset + order.len(),
    };
    if order.len() <= leaf_size {
        nodes.push(leaf);
        return id;
    }

    let (axis, spread) = widest_axis(points, order);
    if spread <= 0.0 {
        // All rows coincide; no split can separate them.
        nodes.push(leaf);
        return id;
    }

    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        points.point(a)[axis]
            .total_cmp(&points.point(b)[axis])
            .then_with(|| a.cmp(&b))
    });
    let value = points.point(order[mid])[axis];

    // Placeholder, patched once both children exist.
    nodes.push(leaf);
    let (lower, upper) = order.split_at_mut(mid);
    let left = build_node(points, lower, offset, leaf_size, nodes);
    let right = build_node(points, upper, offset + mid, leaf_size, nodes);
    nodes[id] = KdNode::Split {
        axis,
        value,
        left,
        right,
    };
    id
}

fn widest_axis(points: &PointSet, rows: &[usize]) -> (usize, f32) {
    let mut best = (0, f32::NEG_INFINITY);
    for axis in 0..points.dimension() {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &row in rows {
            let v = points.point(row)[axis];
            lo = lo.min(v);
            hi = hi.max(v);
        }
        let spread = hi - lo;
        if spread > best.1 {
            best = (axis, spread);
        }
    }
    best
}
