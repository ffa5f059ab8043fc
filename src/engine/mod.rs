//! Evaluation engine: trajectory estimation and the concurrent runner.

mod progress;
mod runner;
mod trajectory;

pub use progress::{Progress, ProgressFn};
pub use runner::{evaluate_sample, EvaluationRunner};
pub use trajectory::estimate_trajectory;
