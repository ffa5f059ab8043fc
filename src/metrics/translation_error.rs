//! Translation error metric.

use serde::Deserialize;
use serde_json::Value;

use super::{check_lengths, Metric};
use crate::core::types::Transform;
use crate::error::{Error, Result};

/// Configuration for [`TranslationError`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TranslationErrorConfig {
    /// Report root-mean-square error instead of the mean.
    pub rms: bool,
}

/// Per-step Euclidean distance between estimated and ground-truth
/// translation parts, averaged over the trajectory (mean by default,
/// root-mean-square with `rms = true`).
pub struct TranslationError {
    use_rms: bool,
}

impl TranslationError {
    /// Create the metric.
    pub fn new(config: TranslationErrorConfig) -> Self {
        Self {
            use_rms: config.rms,
        }
    }

    /// Create the metric from a JSON capability config.
    pub fn from_config(config: &Value) -> Result<Self> {
        let config: TranslationErrorConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::Config(format!("translation_error: {e}")))?;
        Ok(Self::new(config))
    }
}

impl Metric for TranslationError {
    fn name(&self) -> &str {
        "translation_error"
    }

    fn evaluate(&self, estimated: &[Transform], ground_truth: &[Transform]) -> Result<f64> {
        check_lengths(estimated, ground_truth)?;

        if estimated.is_empty() {
            return Ok(0.0);
        }

        let mut accumulator = 0.0;
        for (est, gt) in estimated.iter().zip(ground_truth) {
            let diff = (est.translation() - gt.translation()).norm();
            if self.use_rms {
                accumulator += diff * diff;
            } else {
                accumulator += diff;
            }
        }

        let mean = accumulator / estimated.len() as f64;
        Ok(if self.use_rms { mean.sqrt() } else { mean })
    }
}
