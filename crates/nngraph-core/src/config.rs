//! Graph construction configuration.
//!
//! Options are read from a `nngraph.toml` file, environment variables and
//! command-line overrides, then validated into a typed [`GraphConfig`].
//!
//! # Priority (highest to lowest)
//!
//! 1. Command-line overrides
//! 2. Environment variables (`NNGRAPH_*`, nested keys separated by `__`)
//! 3. Configuration file (`nngraph.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::connectivity::ConnectivityPolicy;
use crate::index::IndexParams;
use crate::kernel::{SimilarityKernel, DEFAULT_SIGMA};
use crate::neighborhood::Topology;
use crate::persistence::OutputFormat;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "nngraph.toml";

/// Neighbors per point used to complete a radius graph.
pub const DEFAULT_COMPLETION_K: usize = 1;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// Two mutually exclusive options were both given.
    #[error("Conflicting options: '{first}' and '{second}' cannot be combined")]
    Conflict {
        /// First option.
        first: String,
        /// Second option.
        second: String,
    },

    /// A required option is missing.
    #[error("Missing option: {0}")]
    Missing(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Output section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Graph file format.
    pub format: OutputFormat,
    /// Output file prefix. Defaults to the dataset file stem.
    pub prefix: Option<String>,
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug or trace.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Raw, unvalidated build options.
///
/// Mirrors the command-line flags one to one. Mutually exclusive groups are
/// plain optional fields here; [`BuildOptions::validate`] turns them into
/// enums.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Directed k-NN graph with this k.
    pub directed: Option<usize>,
    /// Mutual k-NN graph with this k.
    pub mutual: Option<usize>,
    /// Symmetric k-NN graph with this k.
    pub symmetric: Option<usize>,
    /// Radius graph with this radius.
    pub radius: Option<f32>,
    /// Heat kernel bandwidth.
    pub sigma: Option<f32>,
    /// Local-scaling neighbor rank.
    pub local_scaling: Option<usize>,
    /// Keep only the largest component.
    pub prune: bool,
    /// Connect spurious components to their nearest neighbors.
    pub complete: bool,
    /// Neighbors per point when completing a radius graph.
    pub completion_k: Option<usize>,
    /// Neighbor index section.
    pub index: IndexParams,
    /// Output section.
    pub output: OutputConfig,
    /// Logging section.
    pub logging: LoggingConfig,
}

impl BuildOptions {
    /// Loads options from `nngraph.toml` in the working directory, if any.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(DEFAULT_CONFIG_FILE)
    }

    /// Loads options from a specific file path. A missing file is not an
    /// error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("NNGRAPH_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serializes the options to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Replaces the whole topology group with `topology`.
    pub fn set_topology(&mut self, topology: Topology) {
        self.directed = None;
        self.mutual = None;
        self.symmetric = None;
        self.radius = None;
        match topology {
            Topology::Directed { k } => self.directed = Some(k),
            Topology::Mutual { k } => self.mutual = Some(k),
            Topology::Symmetric { k } => self.symmetric = Some(k),
            Topology::Radius { radius } => self.radius = Some(radius),
        }
    }

    /// Replaces the whole weighting group with `kernel`.
    pub fn set_weighting(&mut self, kernel: SimilarityKernel) {
        self.sigma = None;
        self.local_scaling = None;
        match kernel {
            SimilarityKernel::Heat { sigma } => self.sigma = Some(sigma),
            SimilarityKernel::LocallyScaled { rank } => self.local_scaling = Some(rank),
        }
    }

    /// Replaces the connectivity group with `policy`.
    pub fn set_policy(&mut self, policy: ConnectivityPolicy) {
        self.prune = policy == ConnectivityPolicy::Prune;
        self.complete = policy == ConnectivityPolicy::Complete;
    }

    /// Validates the options and resolves every exclusive group.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when no topology is given,
    /// [`ConfigError::Conflict`] when two exclusive options are combined, and
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn validate(&self) -> Result<GraphConfig, ConfigError> {
        let config = GraphConfig {
            topology: self.topology()?,
            weighting: self.weighting()?,
            policy: self.policy()?,
            index: self.index,
            completion_k: self.completion_k.unwrap_or(DEFAULT_COMPLETION_K),
        };
        config.check()?;

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(
                "logging.level",
                format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, LOG_LEVELS
                ),
            ));
        }

        Ok(config)
    }

    fn topology(&self) -> Result<Topology, ConfigError> {
        let given: Vec<(&str, Topology)> = [
            self.directed.map(|k| ("directed", Topology::Directed { k })),
            self.mutual.map(|k| ("mutual", Topology::Mutual { k })),
            self.symmetric.map(|k| ("symmetric", Topology::Symmetric { k })),
            self.radius.map(|radius| ("radius", Topology::Radius { radius })),
        ]
        .into_iter()
        .flatten()
        .collect();

        match given.as_slice() {
            [] => Err(ConfigError::Missing(
                "one of directed, mutual, symmetric or radius".to_string(),
            )),
            [(_, topology)] => Ok(*topology),
            [(first, _), (second, _), ..] => Err(ConfigError::Conflict {
                first: (*first).to_string(),
                second: (*second).to_string(),
            }),
        }
    }

    fn weighting(&self) -> Result<SimilarityKernel, ConfigError> {
        match (self.sigma, self.local_scaling) {
            (Some(_), Some(_)) => Err(ConfigError::Conflict {
                first: "sigma".to_string(),
                second: "local_scaling".to_string(),
            }),
            (_, Some(rank)) => Ok(SimilarityKernel::LocallyScaled { rank }),
            (sigma, None) => Ok(SimilarityKernel::Heat {
                sigma: sigma.unwrap_or(DEFAULT_SIGMA),
            }),
        }
    }

    fn policy(&self) -> Result<ConnectivityPolicy, ConfigError> {
        match (self.prune, self.complete) {
            (true, true) => Err(ConfigError::Conflict {
                first: "prune".to_string(),
                second: "complete".to_string(),
            }),
            (true, false) => Ok(ConnectivityPolicy::Prune),
            (false, true) => Ok(ConnectivityPolicy::Complete),
            (false, false) => Ok(ConnectivityPolicy::None),
        }
    }
}

/// Validated graph construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Neighborhood topology.
    pub topology: Topology,
    /// Edge weighting kernel.
    pub weighting: SimilarityKernel,
    /// Connectivity repair policy.
    pub policy: ConnectivityPolicy,
    /// Neighbor index parameters.
    pub index: IndexParams,
    /// Neighbors per point when completing a radius graph.
    pub completion_k: usize,
}

impl GraphConfig {
    /// Configuration with default kernel, policy and index.
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            weighting: SimilarityKernel::default(),
            policy: ConnectivityPolicy::None,
            index: IndexParams::default(),
            completion_k: DEFAULT_COMPLETION_K,
        }
    }

    /// Sets the weighting kernel.
    #[must_use]
    pub fn with_weighting(mut self, weighting: SimilarityKernel) -> Self {
        self.weighting = weighting;
        self
    }

    /// Sets the connectivity policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ConnectivityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the index parameters.
    #[must_use]
    pub fn with_index(mut self, index: IndexParams) -> Self {
        self.index = index;
        self
    }

    /// Sets the radius-graph completion k.
    #[must_use]
    pub fn with_completion_k(mut self, completion_k: usize) -> Self {
        self.completion_k = completion_k;
        self
    }

    /// Neighbors per point used when completing: the topology's own k, or
    /// `completion_k` for radius graphs.
    #[must_use]
    pub fn effective_completion_k(&self) -> usize {
        self.topology.k().unwrap_or(self.completion_k)
    }

    /// Checks value ranges and cross-group constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range or the kernel cannot be
    /// used with the topology.
    pub fn check(&self) -> Result<(), ConfigError> {
        match self.topology {
            Topology::Directed { k } | Topology::Mutual { k } | Topology::Symmetric { k } => {
                if k == 0 {
                    return Err(invalid(self.topology.name(), "k must be at least 1"));
                }
            }
            Topology::Radius { radius } => {
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(invalid(
                        "radius",
                        format!("value {radius} must be finite and positive"),
                    ));
                }
            }
        }

        match self.weighting {
            SimilarityKernel::Heat { sigma } => {
                if !sigma.is_finite() || sigma <= 0.0 {
                    return Err(invalid(
                        "sigma",
                        format!("value {sigma} must be finite and positive"),
                    ));
                }
            }
            SimilarityKernel::LocallyScaled { rank } => {
                if rank == 0 {
                    return Err(invalid("local_scaling", "rank must be at least 1"));
                }
                if matches!(self.topology, Topology::Radius { .. }) {
                    return Err(invalid(
                        "local_scaling",
                        "local scaling is not available in radius mode",
                    ));
                }
            }
        }

        if self.completion_k == 0 {
            return Err(invalid("completion_k", "value must be at least 1"));
        }
        if self.index.leaf_size == 0 {
            return Err(invalid("index.leaf_size", "value must be at least 1"));
        }

        Ok(())
    }
}
