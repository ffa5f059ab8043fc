//! Rotation error metric.

use serde::Deserialize;
use serde_json::Value;

use super::{check_lengths, Metric};
use crate::core::types::Transform;
use crate::error::{Error, Result};

/// Configuration for [`RotationError`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RotationErrorConfig {
    /// Report the angle in degrees instead of radians.
    pub degrees: bool,
}

impl Default for RotationErrorConfig {
    fn default() -> Self {
        Self { degrees: true }
    }
}

/// Mean geodesic angle between estimated and ground-truth rotations.
///
/// Per step, the angle of `R_gtᵀ · R_est`, the rotation still separating
/// the estimate from the truth.
pub struct RotationError {
    output_in_degrees: bool,
}

impl RotationError {
    /// Create the metric.
    pub fn new(config: RotationErrorConfig) -> Self {
        Self {
            output_in_degrees: config.degrees,
        }
    }

    /// Create the metric from a JSON capability config.
    pub fn from_config(config: &Value) -> Result<Self> {
        let config: RotationErrorConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::Config(format!("rotation_error: {e}")))?;
        Ok(Self::new(config))
    }

    fn angle_between(&self, estimated: &Transform, ground_truth: &Transform) -> f64 {
        let delta = ground_truth.rotation().transpose() * estimated.rotation();
        let cos_theta = ((delta.trace() - 1.0) * 0.5).clamp(-1.0, 1.0);
        let angle = cos_theta.acos();
        if self.output_in_degrees {
            angle.to_degrees()
        } else {
            angle
        }
    }
}

impl Metric for RotationError {
    fn name(&self) -> &str {
        "rotation_error"
    }

    fn evaluate(&self, estimated: &[Transform], ground_truth: &[Transform]) -> Result<f64> {
        check_lengths(estimated, ground_truth)?;

        if estimated.is_empty() {
            return Ok(0.0);
        }

        let total: f64 = estimated
            .iter()
            .zip(ground_truth)
            .map(|(est, gt)| self.angle_between(est, gt))
            .sum();

        Ok(total / estimated.len() as f64)
    }
}
