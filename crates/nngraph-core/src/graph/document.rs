//! Serializable graph snapshot.

use serde::{Deserialize, Serialize};

use super::proximity::ProximityGraph;
use crate::error::Result;
use crate::neighborhood::EdgeList;

/// Plain-data form of a [`ProximityGraph`] for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Number of vertices.
    pub vertex_count: usize,
    /// Directedness flag.
    pub directed: bool,
    /// Edge endpoints in insertion order.
    pub edges: Vec<(usize, usize)>,
    /// Edge weights aligned with `edges`.
    pub weights: Vec<f32>,
    /// Per-vertex `original_index` labels.
    pub original_index: Vec<usize>,
}

impl From<&ProximityGraph> for GraphDocument {
    fn from(graph: &ProximityGraph) -> Self {
        let (edges, weights) = graph.edge_list().into_parts();
        Self {
            vertex_count: graph.vertex_count(),
            directed: graph.is_directed(),
            edges,
            weights,
            original_index: graph.original_indices(),
        }
    }
}

impl GraphDocument {
    /// Rebuilds the graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`](crate::Error::InvalidData) if the arrays
    /// are inconsistent with each other or with `vertex_count`.
    pub fn into_graph(self) -> Result<ProximityGraph> {
        if self.original_index.len() != self.vertex_count {
            return Err(crate::Error::InvalidData(format!(
                "{} labels for {} vertices",
                self.original_index.len(),
                self.vertex_count
            )));
        }
        let edges = EdgeList::from_parts(self.edges, self.weights)?;
        ProximityGraph::with_labels(self.original_index, self.directed, &edges)
    }
}
