//! tula-bench - Concurrent benchmark harness for point-cloud registration
//!
//! Evaluates pluggable registration algorithms against labeled datasets:
//! each sample is a sequence of point clouds with ground-truth world poses,
//! each algorithm is run pairwise over every sample to build an estimated
//! trajectory, and each metric scores the estimate against the truth. The
//! full algorithm × sample cross product executes concurrently on a bounded
//! worker pool, with per-task failures isolated into empty score rows.
//!
//! # Architecture
//!
//! The crate is organized into 4 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     report/                         │  ← Aggregation + CSV
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     engine/                         │  ← Orchestration
//! │            (trajectory, runner, progress)           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │        algorithms/   dataset/   metrics/            │  ← Capabilities
//! │            (resolved by name via registry)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      core/                          │  ← Foundation
//! │              (types: cloud, transform, sample)      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Capabilities are resolved by name through explicitly constructed
//! [`Registry`] instances; there is no process-wide registry state. The
//! `builtin_registry()` constructors in [`algorithms`], [`dataset`], and
//! [`metrics`] preload the shipped implementations, and callers may
//! register their own factories on top (re-registering a name overwrites
//! it, last writer wins).

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Capabilities (depend on core)
// ============================================================================
pub mod algorithms;
pub mod dataset;
pub mod metrics;

// ============================================================================
// Layer 3: Evaluation engine (depends on core, capabilities)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 4: Result aggregation and reporting
// ============================================================================
pub mod report;

// Cross-cutting: errors and capability registry
pub mod error;
pub mod registry;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::types::{PointCloud, Sample, Transform};

// Capability traits
pub use algorithms::Algorithm;
pub use dataset::DatasetLoader;
pub use metrics::Metric;

// Engine
pub use engine::{estimate_trajectory, evaluate_sample, EvaluationRunner, Progress, ProgressFn};

// Results
pub use report::{AlgorithmResults, ScoreRow};

// Errors and registry
pub use error::{Error, Result};
pub use registry::Registry;
