//! Dataset loader capabilities.
//!
//! A dataset loader turns an on-disk dataset into in-memory [`Sample`]s.
//! Loaders run once during setup, before any evaluation task is scheduled;
//! a load failure is fatal to the run.

mod ply;
mod threedmatch;

pub use ply::load_ply;
pub use threedmatch::{ThreeDMatchConfig, ThreeDMatchLoader};

use crate::core::types::Sample;
use crate::error::Result;
use crate::registry::Registry;

/// Trait for dataset loaders.
pub trait DatasetLoader {
    /// Loader name as registered.
    fn name(&self) -> &str;

    /// Load all samples in dataset order.
    fn load_samples(&self) -> Result<Vec<Sample>>;
}

/// Registry preloaded with the built-in dataset loaders.
pub fn builtin_registry() -> Registry<dyn DatasetLoader> {
    let mut registry = Registry::new("dataset loader");
    registry.register("3dmatch", |config| {
        Ok(Box::new(ThreeDMatchLoader::from_config(config)?) as Box<dyn DatasetLoader>)
    });
    registry
}
