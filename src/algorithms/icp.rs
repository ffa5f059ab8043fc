//! Point-to-Point Iterative Closest Point (ICP) algorithm.
//!
//! Aligns two point clouds by repeatedly pairing each source point with its
//! nearest target neighbor and solving for the rigid transform that best
//! maps the pairs onto each other (SVD-based closed form), until the
//! incremental transform falls below the convergence epsilons.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Matrix3, Point3, Vector3};
use serde::Deserialize;
use serde_json::Value;

use super::Algorithm;
use crate::core::types::{PointCloud, Transform};
use crate::error::{Error, Result};

/// Configuration for point-to-point ICP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IcpConfig {
    /// Maximum number of iterations.
    pub max_iterations: u32,

    /// Convergence threshold for the incremental translation (meters).
    pub translation_epsilon: f64,

    /// Convergence threshold for the incremental rotation (radians).
    pub rotation_epsilon: f64,

    /// Maximum correspondence distance (meters).
    ///
    /// Point pairs farther apart than this are rejected as outliers.
    pub max_correspondence_distance: f64,

    /// Minimum number of valid correspondences required per iteration.
    pub min_correspondences: usize,
}

impl Default for IcpConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            translation_epsilon: 1e-4,
            rotation_epsilon: 1e-4,
            max_correspondence_distance: 1.0,
            min_correspondences: 10,
        }
    }
}

/// Point-to-point ICP registration.
///
/// Uses a k-d tree over the target cloud for nearest neighbor queries.
/// Suitable for small initial misalignments; there is no global search
/// stage, so large offsets are expected to fail rather than be recovered.
#[derive(Debug, Clone)]
pub struct Icp {
    config: IcpConfig,
}

impl Icp {
    /// Create an ICP instance with the given configuration.
    pub fn new(config: IcpConfig) -> Self {
        Self { config }
    }

    /// Create an ICP instance from a JSON capability config.
    pub fn from_config(config: &Value) -> Result<Self> {
        let config: IcpConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::Config(format!("icp: {e}")))?;
        Ok(Self::new(config))
    }

    /// Current configuration.
    pub fn config(&self) -> &IcpConfig {
        &self.config
    }

    fn build_kdtree(cloud: &PointCloud) -> KdTree<f64, 3> {
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, point) in cloud.points.iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], i as u64);
        }
        tree
    }

    /// Pair each transformed source point with its nearest target point.
    ///
    /// Returns (source point in current frame, target point) pairs within
    /// the correspondence distance limit.
    fn find_correspondences(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        target_tree: &KdTree<f64, 3>,
        current: &Transform,
    ) -> Vec<(Point3<f64>, Point3<f64>)> {
        let max_dist_sq = self.config.max_correspondence_distance.powi(2);
        let mut correspondences = Vec::with_capacity(source.len());

        for point in &source.points {
            let moved = current.transform_point(point);
            let nearest = target_tree.nearest_one::<SquaredEuclidean>(&[moved.x, moved.y, moved.z]);

            if nearest.distance <= max_dist_sq {
                correspondences.push((moved, target.points[nearest.item as usize]));
            }
        }

        correspondences
    }

    /// Solve for the rigid transform minimizing Σ|R·s + t − d|² over the
    /// correspondence pairs (Arun/Horn closed form via SVD).
    fn solve_rigid(pairs: &[(Point3<f64>, Point3<f64>)]) -> Result<Transform> {
        let n = pairs.len() as f64;

        let mut source_centroid = Vector3::zeros();
        let mut target_centroid = Vector3::zeros();
        for (s, d) in pairs {
            source_centroid += s.coords;
            target_centroid += d.coords;
        }
        source_centroid /= n;
        target_centroid /= n;

        let mut cross_covariance = Matrix3::zeros();
        for (s, d) in pairs {
            cross_covariance += (s.coords - source_centroid) * (d.coords - target_centroid).transpose();
        }

        let svd = cross_covariance.svd(true, true);
        let u = svd
            .u
            .ok_or_else(|| Error::Registration("SVD failed to produce U".into()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| Error::Registration("SVD failed to produce Vᵀ".into()))?;

        let mut rotation = v_t.transpose() * u.transpose();
        if rotation.determinant() < 0.0 {
            // Reflection case: flip the axis of least variance
            let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
            rotation = v_t.transpose() * correction * u.transpose();
        }

        let translation = target_centroid - rotation * source_centroid;
        Ok(Transform::from_parts(rotation, translation))
    }
}

impl Algorithm for Icp {
    fn name(&self) -> &str {
        "icp"
    }

    fn register(&self, source: &PointCloud, target: &PointCloud) -> Result<Transform> {
        if source.is_empty() || target.is_empty() {
            return Err(Error::Registration(
                "icp requires non-empty point clouds".into(),
            ));
        }

        log::debug!(
            "icp: aligning source ({} points) to target ({} points)",
            source.len(),
            target.len()
        );

        let target_tree = Self::build_kdtree(target);
        let mut current = Transform::identity();

        for iteration in 0..self.config.max_iterations {
            let pairs = self.find_correspondences(source, target, &target_tree, &current);
            if pairs.len() < self.config.min_correspondences {
                return Err(Error::Registration(format!(
                    "icp found only {} correspondence(s) at iteration {iteration}, need {}",
                    pairs.len(),
                    self.config.min_correspondences
                )));
            }

            let delta = Self::solve_rigid(&pairs)?;
            current = delta.compose(&current);

            if delta.translation().norm() < self.config.translation_epsilon
                && delta.rotation_angle() < self.config.rotation_epsilon
            {
                log::debug!("icp: converged after {} iteration(s)", iteration + 1);
                return Ok(current);
            }
        }

        Err(Error::Registration(format!(
            "icp did not converge after {} iterations",
            self.config.max_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two-layer grid centered at the origin, 0.5 m spacing.
    fn grid_cloud() -> PointCloud {
        let mut cloud = PointCloud::new();
        for xi in -2..=2 {
            for yi in -2..=2 {
                for zi in 0..2 {
                    cloud.push(Point3::new(
                        xi as f64 * 0.5,
                        yi as f64 * 0.5,
                        zi as f64 * 0.5,
                    ));
                }
            }
        }
        cloud
    }

    fn rotation_z(angle: f64) -> Matrix3<f64> {
        nalgebra::Rotation3::from_axis_angle(&Vector3::z_axis(), angle).into_inner()
    }

    #[test]
    fn test_rejects_empty_clouds() {
        let icp = Icp::new(IcpConfig::default());
        let cloud = grid_cloud();

        assert!(icp.register(&PointCloud::new(), &cloud).is_err());
        assert!(icp.register(&cloud, &PointCloud::new()).is_err());
    }

    #[test]
    fn test_recovers_small_translation() {
        let icp = Icp::new(IcpConfig::default());
        let source = grid_cloud();
        let truth = Transform::from_parts(Matrix3::identity(), Vector3::new(0.05, -0.03, 0.02));
        let target = source.transformed(&truth);

        let estimated = icp.register(&source, &target).unwrap();

        let residual = estimated.translation() - truth.translation();
        assert!(residual.norm() < 1e-6);
        assert!(estimated.rotation_angle() < 1e-6);
    }

    #[test]
    fn test_recovers_small_rigid_motion() {
        let icp = Icp::new(IcpConfig::default());
        let source = grid_cloud();
        let truth = Transform::from_parts(rotation_z(0.05), Vector3::new(0.04, 0.02, -0.01));
        let target = source.transformed(&truth);

        let estimated = icp.register(&source, &target).unwrap();

        let residual = estimated.translation() - truth.translation();
        assert!(residual.norm() < 1e-6);
        assert_relative_eq!(estimated.rotation_angle(), 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_fails_when_correspondences_out_of_range() {
        let icp = Icp::new(IcpConfig {
            max_correspondence_distance: 0.01,
            ..IcpConfig::default()
        });
        let source = grid_cloud();
        // Offset larger than the correspondence limit on every pair
        let shift = Transform::from_parts(Matrix3::identity(), Vector3::new(10.0, 0.0, 0.0));
        let target = source.transformed(&shift);

        assert!(icp.register(&source, &target).is_err());
    }

    #[test]
    fn test_from_config_overrides() {
        let config = serde_json::json!({ "name": "icp", "max_iterations": 7 });
        let icp = Icp::from_config(&config).unwrap();
        assert_eq!(icp.config().max_iterations, 7);
        // Unspecified fields keep their defaults
        assert_eq!(icp.config().min_correspondences, 10);
    }
}
