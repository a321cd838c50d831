//! Linear-scan search, the reference the kd-tree must agree with.

use super::neighbors::{CandidateHeap, Neighbor};
use crate::distance::DistanceMetric;
use crate::point_set::PointSet;

pub(crate) fn knn(
    points: &PointSet,
    metric: DistanceMetric,
    query: &[f32],
    heap: &mut CandidateHeap,
) {
    for (row, point) in points.rows().enumerate() {
        heap.push(Neighbor::new(row, metric.calculate(query, point)));
    }
}

pub(crate) fn radius(
    points: &PointSet,
    metric: DistanceMetric,
    query: &[f32],
    radius: f32,
    out: &mut Vec<Neighbor>,
) {
    for (row, point) in points.rows().enumerate() {
        let distance = metric.calculate(query, point);
        if distance <= radius {
            out.push(Neighbor::new(row, distance));
        }
    }
}
