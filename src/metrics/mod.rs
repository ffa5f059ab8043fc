//! Trajectory metric capabilities.
//!
//! A metric reduces an estimated trajectory and its ground truth to one
//! scalar score. Both sequences must have equal length; empty sequences
//! score 0.0 by convention.

mod rotation_error;
mod translation_error;

pub use rotation_error::{RotationError, RotationErrorConfig};
pub use translation_error::{TranslationError, TranslationErrorConfig};

use crate::core::types::Transform;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Trait for trajectory metrics.
///
/// Metrics are stateless per call and shared across concurrent evaluation
/// tasks, hence `Send + Sync`.
pub trait Metric: Send + Sync {
    /// Metric name as registered; also the CSV column header.
    fn name(&self) -> &str;

    /// Score an estimated trajectory against ground truth.
    ///
    /// Fails with [`Error::LengthMismatch`] if the sequences differ in
    /// length.
    fn evaluate(&self, estimated: &[Transform], ground_truth: &[Transform]) -> Result<f64>;
}

/// Registry preloaded with the built-in metrics.
pub fn builtin_registry() -> Registry<dyn Metric> {
    let mut registry = Registry::new("metric");
    registry.register("translation_error", |config| {
        Ok(Box::new(TranslationError::from_config(config)?) as Box<dyn Metric>)
    });
    registry.register("rotation_error", |config| {
        Ok(Box::new(RotationError::from_config(config)?) as Box<dyn Metric>)
    });
    registry
}

/// Shared length guard for metric implementations.
pub(crate) fn check_lengths(estimated: &[Transform], ground_truth: &[Transform]) -> Result<()> {
    if estimated.len() != ground_truth.len() {
        return Err(Error::LengthMismatch {
            estimated: estimated.len(),
            ground_truth: ground_truth.len(),
        });
    }
    Ok(())
}
