//! Error types for tula-bench

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Benchmark error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed benchmark or capability configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Capability name absent from its registry
    #[error("{kind} not registered: {name}")]
    NotRegistered {
        /// Capability kind ("algorithm", "dataset loader", "metric")
        kind: &'static str,
        /// The name that was looked up
        name: String,
    },

    /// Pairwise registration failed (non-convergence or invalid input)
    #[error("Registration failed: {0}")]
    Registration(String),

    /// Dataset is missing or malformed
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Metric inputs have different lengths
    #[error("estimated and ground truth transform counts must match ({estimated} vs {ground_truth})")]
    LengthMismatch {
        /// Number of estimated transforms
        estimated: usize,
        /// Number of ground truth transforms
        ground_truth: usize,
    },
}
