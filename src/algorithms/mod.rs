//! Registration algorithm capabilities.
//!
//! An algorithm aligns a source point cloud to a target point cloud and
//! returns the relative rigid transform. Algorithms are resolved by name
//! from a [`Registry`] built during setup.

mod icp;

pub use icp::{Icp, IcpConfig};

use crate::core::types::{PointCloud, Transform};
use crate::error::Result;
use crate::registry::Registry;

/// Trait for pairwise point-cloud registration algorithms.
///
/// One algorithm instance is invoked concurrently from multiple evaluation
/// tasks; the runner never serializes calls to a single instance, so the
/// `Send + Sync` bound is a hard precondition, not a convention.
pub trait Algorithm: Send + Sync {
    /// Algorithm name as registered.
    fn name(&self) -> &str;

    /// Align `source` to `target`.
    ///
    /// Returns the relative transform mapping source-frame coordinates into
    /// the target frame, or a registration error on non-convergence or
    /// invalid input (e.g. an empty cloud).
    fn register(&self, source: &PointCloud, target: &PointCloud) -> Result<Transform>;
}

/// Registry preloaded with the built-in algorithms.
pub fn builtin_registry() -> Registry<dyn Algorithm> {
    let mut registry = Registry::new("algorithm");
    registry.register("icp", |config| {
        Ok(Box::new(Icp::from_config(config)?) as Box<dyn Algorithm>)
    });
    registry
}
