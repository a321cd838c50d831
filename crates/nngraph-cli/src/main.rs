//! nngraph CLI
//!
//! Builds a weighted k-NN or radius graph from a point matrix and writes the
//! graph, the neighbor index and (after pruning) the filtered points.

// CLI tool - relax pedantic lints for ergonomics
#![allow(clippy::pedantic)]

mod output;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, ValueEnum};
use colored::Colorize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use nngraph_core::{
    read_points, BuildOptions, ConnectivityPolicy, DistanceMetric, IndexKind, OutputFormat,
    Pipeline, PipelineOutput, SimilarityKernel, Topology,
};

use crate::output::OutputPaths;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IndexArg {
    /// Exact kd-tree
    Kdtree,
    /// Linear scan
    BruteForce,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    /// Squared L2 distance
    SquaredEuclidean,
    /// L2 distance
    Euclidean,
}

#[derive(Parser, Debug)]
#[command(name = "nngraph")]
#[command(version)]
#[command(about = "Build weighted neighborhood graphs from point matrices", long_about = None)]
#[command(group(ArgGroup::new("topology").args(["directed", "mutual", "symmetric", "radius"])))]
#[command(group(ArgGroup::new("weighting").args(["sigma", "local_scaling"])))]
#[command(group(ArgGroup::new("format").args(["edgelist", "json", "binary"])))]
struct Cli {
    /// Point matrix: one point per line, values separated by spaces or commas
    #[arg(value_name = "DATASET")]
    dataset: PathBuf,

    /// Directed k-NN graph
    #[arg(long, value_name = "K")]
    directed: Option<usize>,

    /// Mutual k-NN graph
    #[arg(long, value_name = "K")]
    mutual: Option<usize>,

    /// Symmetric k-NN graph
    #[arg(long, value_name = "K")]
    symmetric: Option<usize>,

    /// Fixed-radius graph (radius in metric units)
    #[arg(long, value_name = "R")]
    radius: Option<f32>,

    /// Heat kernel bandwidth [default: 0.5]
    #[arg(long, value_name = "S")]
    sigma: Option<f32>,

    /// Locally-scaled kernel using the RANK-th neighbor distance
    #[arg(long, value_name = "RANK")]
    local_scaling: Option<usize>,

    /// Write the graph as a text edge list
    #[arg(long)]
    edgelist: bool,

    /// Write the graph as JSON
    #[arg(long)]
    json: bool,

    /// Write the graph as bincode (default)
    #[arg(long)]
    binary: bool,

    /// Keep only the largest connected component
    #[arg(long, visible_alias = "delete", conflicts_with = "complete")]
    prune: bool,

    /// Connect spurious components with k-NN edges
    #[arg(long)]
    complete: bool,

    /// Neighbors per point when completing a radius graph [default: 1]
    #[arg(long, value_name = "K")]
    completion_k: Option<usize>,

    /// Output file prefix [default: dataset file name without extension]
    #[arg(long)]
    prefix: Option<String>,

    /// Configuration file path [default: nngraph.toml]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Neighbor index structure
    #[arg(long, value_enum)]
    index: Option<IndexArg>,

    /// Maximum kd-tree leaf size
    #[arg(long, value_name = "N")]
    leaf_size: Option<usize>,

    /// Distance metric
    #[arg(long, value_enum)]
    metric: Option<MetricArg>,

    /// Run every query on the calling thread
    #[arg(long)]
    sequential: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Layers command-line flags over file and environment options.
    fn apply(&self, options: &mut BuildOptions) {
        let topology = [
            self.directed.map(|k| Topology::Directed { k }),
            self.mutual.map(|k| Topology::Mutual { k }),
            self.symmetric.map(|k| Topology::Symmetric { k }),
            self.radius.map(|radius| Topology::Radius { radius }),
        ]
        .into_iter()
        .flatten()
        .next();
        if let Some(topology) = topology {
            options.set_topology(topology);
        }

        if let Some(sigma) = self.sigma {
            options.set_weighting(SimilarityKernel::Heat { sigma });
        } else if let Some(rank) = self.local_scaling {
            options.set_weighting(SimilarityKernel::LocallyScaled { rank });
        }

        if self.prune {
            options.set_policy(ConnectivityPolicy::Prune);
        } else if self.complete {
            options.set_policy(ConnectivityPolicy::Complete);
        }
        if self.completion_k.is_some() {
            options.completion_k = self.completion_k;
        }

        if self.edgelist {
            options.output.format = OutputFormat::EdgeList;
        } else if self.json {
            options.output.format = OutputFormat::Json;
        } else if self.binary {
            options.output.format = OutputFormat::Binary;
        }
        if let Some(prefix) = &self.prefix {
            options.output.prefix = Some(prefix.clone());
        }

        if let Some(index) = self.index {
            options.index.kind = match index {
                IndexArg::Kdtree => IndexKind::KdTree,
                IndexArg::BruteForce => IndexKind::BruteForce,
            };
        }
        if let Some(leaf_size) = self.leaf_size {
            options.index.leaf_size = leaf_size;
        }
        if let Some(metric) = self.metric {
            options.index.metric = match metric {
                MetricArg::SquaredEuclidean => DistanceMetric::SquaredEuclidean,
                MetricArg::Euclidean => DistanceMetric::Euclidean,
            };
        }
        if self.sequential {
            options.index.parallel = false;
        }
        if self.verbose {
            options.logging.level = "debug".to_string();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found: {}", path.display());
            }
            BuildOptions::load_from_path(path)
        }
        None => BuildOptions::load(),
    }
    .context("failed to load configuration")?;
    cli.apply(&mut options);
    let config = options.validate().context("invalid configuration")?;

    if cli.print_config {
        print!("{}", options.to_toml()?);
        return Ok(());
    }

    let level: Level = options
        .logging
        .level
        .parse()
        .context("invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let points = read_points(&cli.dataset)
        .with_context(|| format!("failed to read {}", cli.dataset.display()))?;
    info!(
        "Loaded {} points of dimension {} from {}",
        points.len(),
        points.dimension(),
        cli.dataset.display()
    );

    let run = Pipeline::new(config)?.run(points)?;

    let prefix = options
        .output
        .prefix
        .clone()
        .unwrap_or_else(|| OutputPaths::default_prefix(&cli.dataset));
    let paths = OutputPaths::new(&prefix, options.output.format, run.pruned);
    paths.write(&run, options.output.format)?;

    print_summary(&run, &paths);
    Ok(())
}

fn print_summary(run: &PipelineOutput, paths: &OutputPaths) {
    if run.connectivity.is_connected() {
        println!("{}", "Graph is connected".green().bold());
    } else {
        println!(
            "{} ({} components)",
            "Graph is disconnected".red().bold(),
            run.connectivity.component_count
        );
    }

    let stats = &run.stats;
    println!("  Vertices:   {}", stats.vertices);
    println!("  Edges:      {}", stats.edges);
    if run.pruned {
        println!("  Pruned:     {}", stats.removed.to_string().yellow());
    }
    if stats.added > 0 {
        println!("  Completed:  {}", stats.added.to_string().green());
    }
    println!("  Duration:   {:.3}s", stats.duration_secs);
    for path in paths.all() {
        println!("  Wrote {}", path.display().to_string().cyan());
    }
}
