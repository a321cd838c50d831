//! Connectivity analysis and repair.
//!
//! A graph is decomposed into weak components, largest first. Anything
//! outside the largest component is *spurious*; the policy decides whether
//! spurious vertices are reported, pruned or wired back with k-NN edges.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::ProximityGraph;
use crate::index::KnnTable;
use crate::neighborhood::NeighborhoodBuilder;

/// What to do with a disconnected graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityPolicy {
    /// Report the disconnection and keep the graph as is.
    #[default]
    None,
    /// Keep only the largest component.
    Prune,
    /// Add k-NN edges from every spurious vertex.
    Complete,
}

impl std::fmt::Display for ConnectivityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Prune => write!(f, "prune"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Component decomposition of one graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    /// Number of weak components.
    pub component_count: usize,
    /// Vertex count of the largest component.
    pub largest_size: usize,
    /// `original_index` of every vertex outside the largest component,
    /// ascending.
    pub spurious: Vec<usize>,
}

impl ConnectivityReport {
    /// Decomposes `graph`.
    #[must_use]
    pub fn of(graph: &ProximityGraph) -> Self {
        let components = graph.components();
        let largest_size = components.first().map_or(0, |c| c.len());
        let mut spurious: Vec<usize> = components
            .iter()
            .skip(1)
            .flat_map(|c| c.vertices().iter().map(|&v| graph.original_index(v)))
            .collect();
        spurious.sort_unstable();

        Self {
            component_count: components.len(),
            largest_size,
            spurious,
        }
    }

    /// True when the graph has a single component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.component_count == 1
    }
}

/// Terminal state of a repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The graph already had one component.
    Connected,
    /// More than one component and no policy; the graph is left as is.
    Disconnected {
        /// Number of components.
        components: usize,
    },
    /// The caller must rebuild over the points that remain after removing
    /// `removed` (original indices, ascending).
    Pruned {
        /// Spurious vertices to drop.
        removed: Vec<usize>,
    },
    /// Completion edges were merged into the graph. Connectivity is not
    /// re-checked.
    Completed {
        /// Number of edges added.
        added: usize,
    },
}

/// Applies a [`ConnectivityPolicy`] to an assembled graph.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityRepair {
    policy: ConnectivityPolicy,
}

impl ConnectivityRepair {
    /// Creates a repair step for `policy`.
    #[must_use]
    pub fn new(policy: ConnectivityPolicy) -> Self {
        Self { policy }
    }

    /// Configured policy.
    #[must_use]
    pub fn policy(&self) -> ConnectivityPolicy {
        self.policy
    }

    /// Whether `report` calls for a k-NN table, i.e. completion will run.
    #[must_use]
    pub fn needs_table(&self, report: &ConnectivityReport) -> bool {
        self.policy == ConnectivityPolicy::Complete && !report.is_connected()
    }

    /// Runs the policy over `graph`.
    ///
    /// `table` is only read by the complete policy and must hold k-NN rows
    /// for every vertex; pruning never mutates `graph` and leaves the rebuild
    /// to the caller.
    ///
    /// # Errors
    ///
    /// Returns a kernel error, or [`Error::InvalidData`](crate::Error::InvalidData)
    /// if completion runs without a table or with one that misses a vertex.
    pub fn repair(
        &self,
        graph: &mut ProximityGraph,
        report: &ConnectivityReport,
        table: Option<&KnnTable>,
        builder: &NeighborhoodBuilder,
    ) -> Result<RepairOutcome> {
        if report.is_connected() || graph.vertex_count() == 0 {
            return Ok(RepairOutcome::Connected);
        }

        match self.policy {
            ConnectivityPolicy::None => Ok(RepairOutcome::Disconnected {
                components: report.component_count,
            }),
            ConnectivityPolicy::Prune => Ok(RepairOutcome::Pruned {
                removed: report.spurious.clone(),
            }),
            ConnectivityPolicy::Complete => {
                let table = table.ok_or_else(|| {
                    crate::Error::InvalidData("completion requires a k-NN table".to_string())
                })?;
                let existing = graph.edge_list();
                let added = builder.completion(table, &report.spurious, &existing)?;
                graph.add_edges(&added)?;
                Ok(RepairOutcome::Completed { added: added.len() })
            }
        }
    }
}
