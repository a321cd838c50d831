//! Graph construction pipeline.
//!
//! One pass builds the index, queries neighbors, turns them into weighted
//! edges and assembles the graph. Connectivity repair follows; pruning
//! triggers exactly one more pass over the surviving points.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::connectivity::{ConnectivityPolicy, ConnectivityRepair, ConnectivityReport, RepairOutcome};
use crate::error::Result;
use crate::graph::ProximityGraph;
use crate::index::{IndexKind, KnnTable, NeighborIndex};
use crate::neighborhood::{NeighborQuery, NeighborhoodBuilder, Topology};
use crate::point_set::PointSet;

/// Progress notifications emitted by [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// An index build is starting.
    IndexBuildStarted {
        /// 1 for the first pass, 2 for the rebuild after pruning.
        pass: usize,
        /// Points indexed.
        points: usize,
        /// Point dimension.
        dimension: usize,
        /// Index structure.
        kind: IndexKind,
    },
    /// The neighbor query is starting.
    QueryStarted {
        /// Pass number.
        pass: usize,
        /// Topology being queried.
        topology: Topology,
    },
    /// The graph of a pass is assembled.
    GraphAssembled {
        /// Pass number.
        pass: usize,
        /// Vertex count.
        vertices: usize,
        /// Edge count.
        edges: usize,
    },
    /// A k-NN query was run only to complete a radius graph.
    FallbackQuery {
        /// Neighbors per point.
        k: usize,
    },
    /// Spurious vertices were dropped ahead of the rebuild.
    Pruned {
        /// Points removed.
        removed: usize,
        /// Points kept.
        remaining: usize,
    },
    /// Completion edges were added.
    Completed {
        /// Edges added.
        added: usize,
    },
    /// Final connectivity of the output graph.
    Verdict {
        /// Number of weak components.
        components: usize,
    },
}

/// Receives [`PipelineEvent`]s.
pub trait PipelineObserver {
    /// Called once per event, in pipeline order.
    fn on_event(&mut self, event: &PipelineEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::IndexBuildStarted {
                pass,
                points,
                dimension,
                kind,
            } => info!(pass, "Building {kind} index over {points} points of dimension {dimension}"),
            PipelineEvent::QueryStarted { pass, topology } => {
                info!(pass, "Querying neighbors for {topology} graph");
            }
            PipelineEvent::GraphAssembled {
                pass,
                vertices,
                edges,
            } => debug!(pass, vertices, edges, "Graph assembled"),
            PipelineEvent::FallbackQuery { k } => {
                debug!(k, "Running k-NN query for completion");
            }
            PipelineEvent::Pruned { removed, remaining } => {
                info!("Pruned {removed} spurious points, rebuilding over {remaining}");
            }
            PipelineEvent::Completed { added } => info!("Completion added {added} edges"),
            PipelineEvent::Verdict { components } => {
                if *components <= 1 {
                    info!("Graph is connected");
                } else {
                    warn!(components, "Graph is disconnected");
                }
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&mut self, _event: &PipelineEvent) {}
}

/// Run statistics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PipelineStats {
    /// Passes run (2 after pruning).
    pub passes: usize,
    /// Points removed by pruning.
    pub removed: usize,
    /// Edges added by completion.
    pub added: usize,
    /// Final vertex count.
    pub vertices: usize,
    /// Final edge count.
    pub edges: usize,
    /// Final number of weak components.
    pub components: usize,
    /// Wall time in seconds.
    pub duration_secs: f64,
}

impl PipelineStats {
    /// Average out-degree of the final graph.
    #[must_use]
    pub fn mean_degree(&self) -> f64 {
        if self.vertices > 0 {
            self.edges as f64 / self.vertices as f64
        } else {
            0.0
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Final graph.
    pub graph: ProximityGraph,
    /// Index over the final point set.
    pub index: NeighborIndex,
    /// `retained_rows[v]` is the input row vertex `v` was built from.
    pub retained_rows: Vec<usize>,
    /// Whether pruning removed points.
    pub pruned: bool,
    /// Connectivity of the final graph.
    pub connectivity: ConnectivityReport,
    /// Run statistics.
    pub stats: PipelineStats,
}

impl PipelineOutput {
    /// Final point set, filtered if pruning happened.
    #[must_use]
    pub fn points(&self) -> &PointSet {
        self.index.points()
    }
}

struct Pass {
    index: NeighborIndex,
    table: Option<KnnTable>,
    graph: ProximityGraph,
    report: ConnectivityReport,
}

/// Graph construction pipeline.
pub struct Pipeline<O = TracingObserver> {
    config: GraphConfig,
    builder: NeighborhoodBuilder,
    observer: O,
}

impl Pipeline {
    /// Creates a pipeline reporting through `tracing`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is out of range.
    pub fn new(config: GraphConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            config,
            builder: NeighborhoodBuilder::new(config.weighting).with_parallel(config.index.parallel),
            observer: TracingObserver,
        })
    }
}

impl<O: PipelineObserver> Pipeline<O> {
    /// Replaces the observer.
    #[must_use]
    pub fn with_observer<P: PipelineObserver>(self, observer: P) -> Pipeline<P> {
        Pipeline {
            config: self.config,
            builder: self.builder,
            observer,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Observer in use.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Builds the graph for `points` and applies the connectivity policy.
    ///
    /// # Errors
    ///
    /// Any index, query or kernel error aborts the run.
    pub fn run(&mut self, points: PointSet) -> Result<PipelineOutput> {
        let start = Instant::now();
        let repair = ConnectivityRepair::new(self.config.policy);
        let mut stats = PipelineStats::default();
        let mut retained_rows: Vec<usize> = (0..points.len()).collect();
        let mut pruned = false;

        let Pass {
            mut index,
            table,
            mut graph,
            report,
        } = self.pass(1, points)?;
        stats.passes = 1;

        let fallback = if repair.needs_table(&report) && table.is_none() {
            let k = self.config.effective_completion_k();
            self.emit(&PipelineEvent::FallbackQuery { k });
            Some(index.query_knn(k)?)
        } else {
            None
        };
        let table = table.as_ref().or(fallback.as_ref());

        match repair.repair(&mut graph, &report, table, &self.builder)? {
            RepairOutcome::Connected | RepairOutcome::Disconnected { .. } => {}
            RepairOutcome::Pruned { removed } => {
                let (filtered, kept) = index.points().without(&removed)?;
                self.emit(&PipelineEvent::Pruned {
                    removed: removed.len(),
                    remaining: filtered.len(),
                });

                let second = self.pass(2, filtered)?;
                index = second.index;
                graph = second.graph;
                retained_rows = kept;
                pruned = true;
                stats.passes = 2;
                stats.removed = removed.len();
            }
            RepairOutcome::Completed { added } => {
                self.emit(&PipelineEvent::Completed { added });
                stats.added = added;
            }
        }

        let connectivity = if self.config.policy == ConnectivityPolicy::None && !pruned {
            report
        } else {
            ConnectivityReport::of(&graph)
        };
        self.emit(&PipelineEvent::Verdict {
            components: connectivity.component_count,
        });

        stats.vertices = graph.vertex_count();
        stats.edges = graph.edge_count();
        stats.components = connectivity.component_count;
        stats.duration_secs = start.elapsed().as_secs_f64();

        Ok(PipelineOutput {
            graph,
            index,
            retained_rows,
            pruned,
            connectivity,
            stats,
        })
    }

    fn pass(&mut self, pass: usize, points: PointSet) -> Result<Pass> {
        let topology = self.config.topology;
        self.emit(&PipelineEvent::IndexBuildStarted {
            pass,
            points: points.len(),
            dimension: points.dimension(),
            kind: self.config.index.kind,
        });
        let index = NeighborIndex::build(points, self.config.index)?;

        self.emit(&PipelineEvent::QueryStarted { pass, topology });
        let query = NeighborQuery::run(&index, topology)?;
        let edges = self.builder.build(topology, &query)?;
        let graph = ProximityGraph::assemble(index.len(), topology.is_directed(), &edges)?;
        self.emit(&PipelineEvent::GraphAssembled {
            pass,
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
        });

        let report = ConnectivityReport::of(&graph);
        let table = match query {
            NeighborQuery::Knn(table) => Some(table),
            NeighborQuery::Radius(_) => None,
        };
        Ok(Pass {
            index,
            table,
            graph,
            report,
        })
    }

    fn emit(&mut self, event: &PipelineEvent) {
        self.observer.on_event(event);
    }
}
