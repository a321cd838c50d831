//! Output file naming and writing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nngraph_core::{save_graph, write_points, OutputFormat, PipelineOutput};

/// Files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Graph file.
    pub graph: PathBuf,
    /// Serialized neighbor index.
    pub index: PathBuf,
    /// Filtered point matrix, only after pruning.
    pub points: Option<PathBuf>,
}

impl OutputPaths {
    /// Paths for `prefix`; `-pruned` is appended when pruning happened.
    pub fn new(prefix: &str, format: OutputFormat, pruned: bool) -> Self {
        let prefix = if pruned {
            format!("{prefix}-pruned")
        } else {
            prefix.to_string()
        };
        Self {
            graph: PathBuf::from(format!("{prefix}-graph.{}", format.extension())),
            index: PathBuf::from(format!("{prefix}-index.knn")),
            points: pruned.then(|| PathBuf::from(format!("{prefix}.dat"))),
        }
    }

    /// Default prefix: the dataset file name without its extension, so
    /// outputs land in the working directory.
    pub fn default_prefix(dataset: &Path) -> String {
        dataset
            .file_stem()
            .map_or_else(|| "graph".to_string(), |stem| stem.to_string_lossy().into_owned())
    }

    /// Writes every output of `run`.
    pub fn write(&self, run: &PipelineOutput, format: OutputFormat) -> Result<()> {
        save_graph(&self.graph, &run.graph, format)
            .with_context(|| format!("failed to write graph to {}", self.graph.display()))?;
        run.index
            .save(&self.index)
            .with_context(|| format!("failed to write index to {}", self.index.display()))?;
        if let Some(points) = &self.points {
            write_points(points, run.points())
                .with_context(|| format!("failed to write points to {}", points.display()))?;
        }
        Ok(())
    }

    /// Every path that [`OutputPaths::write`] creates.
    pub fn all(&self) -> impl Iterator<Item = &Path> {
        [Some(&self.graph), Some(&self.index), self.points.as_ref()]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
    }
}
