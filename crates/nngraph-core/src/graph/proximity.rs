//! Weighted proximity graph backed by `petgraph`.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::components::{weak_components, Component};
use crate::error::{Error, Result};
use crate::neighborhood::EdgeList;

/// Vertex payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// Row of the point set this vertex was built from, in the current pass.
    pub original_index: usize,
}

/// Vertex/edge graph with a directedness flag fixed at construction.
///
/// Edges are stored in insertion order and keep their orientation; for an
/// undirected graph the orientation carries no meaning.
#[derive(Debug, Clone)]
pub struct ProximityGraph {
    inner: DiGraph<Vertex, f32>,
    directed: bool,
}

impl ProximityGraph {
    /// Assembles a graph of `vertex_count` vertices labeled `0..vertex_count`
    /// and adds `edges` verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if an edge references a missing vertex.
    pub fn assemble(vertex_count: usize, directed: bool, edges: &EdgeList) -> Result<Self> {
        Self::with_labels((0..vertex_count).collect(), directed, edges)
    }

    /// Assembles a graph with explicit `original_index` labels, one per vertex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if an edge references a missing vertex.
    pub fn with_labels(labels: Vec<usize>, directed: bool, edges: &EdgeList) -> Result<Self> {
        let mut inner = DiGraph::with_capacity(labels.len(), edges.len());
        for original_index in labels {
            inner.add_node(Vertex { original_index });
        }
        let mut graph = Self { inner, directed };
        graph.add_edges(edges)?;
        Ok(graph)
    }

    /// Appends edges, keeping existing ones untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if an edge references a missing vertex;
    /// the graph is left unchanged in that case.
    pub fn add_edges(&mut self, edges: &EdgeList) -> Result<()> {
        let n = self.vertex_count();
        if let Some(&(s, t)) = edges.edges().iter().find(|&&(s, t)| s >= n || t >= n) {
            return Err(Error::InvalidData(format!(
                "edge ({s}, {t}) references a vertex outside 0..{n}"
            )));
        }
        self.inner.reserve_edges(edges.len());
        for (s, t, w) in edges.iter() {
            self.inner.add_edge(NodeIndex::new(s), NodeIndex::new(t), w);
        }
        Ok(())
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether the graph is directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// `original_index` label of vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v >= vertex_count()`.
    #[must_use]
    pub fn original_index(&self, v: usize) -> usize {
        self.inner[NodeIndex::new(v)].original_index
    }

    /// All `original_index` labels in vertex order.
    #[must_use]
    pub fn original_indices(&self) -> Vec<usize> {
        self.inner
            .node_weights()
            .map(|vertex| vertex.original_index)
            .collect()
    }

    /// Iterates over `(source, target, weight)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.inner
            .raw_edges()
            .iter()
            .map(|e| (e.source().index(), e.target().index(), e.weight))
    }

    /// Edge weights in insertion order.
    #[must_use]
    pub fn weights(&self) -> Vec<f32> {
        self.inner.raw_edges().iter().map(|e| e.weight).collect()
    }

    /// Copies the edges out as an [`EdgeList`].
    #[must_use]
    pub fn edge_list(&self) -> EdgeList {
        let mut list = EdgeList::new();
        for (s, t, w) in self.edges() {
            list.push(s, t, w);
        }
        list
    }

    /// Weakly-connected components, largest first.
    ///
    /// Ties in size are broken by the smallest `original_index` in each
    /// component.
    #[must_use]
    pub fn components(&self) -> Vec<Component> {
        weak_components(self.vertex_count(), self.edges().map(|(s, t, _)| (s, t)), |v| {
            self.original_index(v)
        })
    }

    /// Whether the graph has exactly one weak component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.components().len() == 1
    }

    /// Underlying `petgraph` graph, for algorithms beyond this API.
    #[must_use]
    pub fn as_petgraph(&self) -> &DiGraph<Vertex, f32> {
        &self.inner
    }
}
