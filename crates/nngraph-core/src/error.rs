//! Error types for `nngraph`.
//!
//! Every failure of a graph build is fatal: the pipeline aborts and nothing is
//! written. A disconnected graph is not an error, see
//! [`ConnectivityReport`](crate::connectivity::ConnectivityReport).

use thiserror::Error;

/// Result type alias for `nngraph` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a proximity graph.
///
/// Error codes follow the pattern `NNG-XXX`.
#[derive(Error, Debug)]
pub enum Error {
    /// Conflicting or missing options (NNG-001).
    ///
    /// Reported before any computation starts.
    #[error("[NNG-001] Configuration error: {0}")]
    Config(String),

    /// The neighbor index could not be built (NNG-002).
    ///
    /// Raised for an empty or ragged point matrix.
    #[error("[NNG-002] Index build error: {0}")]
    IndexBuild(String),

    /// Neighbor count outside `1..points` (NNG-003).
    #[error("[NNG-003] Invalid k: {k} (point set has {points} points, k must be in 1..{points})")]
    InvalidK {
        /// Requested number of neighbors.
        k: usize,
        /// Number of points in the index.
        points: usize,
    },

    /// Local scaling rank exceeds the neighbors retrieved for a point (NNG-004).
    #[error(
        "[NNG-004] Insufficient neighbors: point {point} has {available} neighbors, local scaling needs rank {rank}"
    )]
    InsufficientNeighbors {
        /// Point whose neighbor list is too short.
        point: usize,
        /// Configured local scaling rank (1-indexed).
        rank: usize,
        /// Neighbors actually retrieved for the point.
        available: usize,
    },

    /// Query vector of the wrong dimension (NNG-005).
    #[error("[NNG-005] Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the indexed points.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// Malformed input data (NNG-006).
    #[error("[NNG-006] Invalid data: {0}")]
    InvalidData(String),

    /// IO error (NNG-007).
    #[error("[NNG-007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (NNG-008).
    #[error("[NNG-008] Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns the error code (e.g., "NNG-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "NNG-001",
            Self::IndexBuild(_) => "NNG-002",
            Self::InvalidK { .. } => "NNG-003",
            Self::InsufficientNeighbors { .. } => "NNG-004",
            Self::DimensionMismatch { .. } => "NNG-005",
            Self::InvalidData(_) => "NNG-006",
            Self::Io(_) => "NNG-007",
            Self::Serialization(_) => "NNG-008",
        }
    }

    /// Returns true if the error was raised before any computation started.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
