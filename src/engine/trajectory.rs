//! Trajectory estimation from pairwise registration.

use crate::algorithms::Algorithm;
use crate::core::types::{PointCloud, Transform};
use crate::error::Result;

/// Compose an algorithm's pairwise registrations into an absolute trajectory.
///
/// The first cloud defines the local origin, so `estimated[0]` is identity;
/// each later cloud is registered against its predecessor and the relative
/// transform chained onto the accumulated pose:
/// `estimated[i] = estimated[i-1] * R_i`. Drift accumulates; there is no
/// global optimization or loop closure.
///
/// Any pairwise failure fails the whole sample; no partial trajectory is
/// produced and no alternative pairing is tried.
pub fn estimate_trajectory(
    algorithm: &dyn Algorithm,
    point_clouds: &[PointCloud],
) -> Result<Vec<Transform>> {
    let mut transforms = Vec::with_capacity(point_clouds.len());

    if point_clouds.is_empty() {
        return Ok(transforms);
    }

    transforms.push(Transform::identity());

    for idx in 1..point_clouds.len() {
        let source = &point_clouds[idx];
        let target = &point_clouds[idx - 1];
        let relative = algorithm.register(source, target)?;
        let absolute = transforms[idx - 1].compose(&relative);
        transforms.push(absolute);
    }

    Ok(transforms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use nalgebra::{Matrix3, Vector3};

    /// Returns a fixed relative transform for every pairwise call.
    struct FixedStep {
        step: Transform,
    }

    impl Algorithm for FixedStep {
        fn name(&self) -> &str {
            "fixed-step"
        }

        fn register(&self, _source: &PointCloud, _target: &PointCloud) -> Result<Transform> {
            Ok(self.step)
        }
    }

    /// Fails on every call.
    struct AlwaysFails;

    impl Algorithm for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }

        fn register(&self, _source: &PointCloud, _target: &PointCloud) -> Result<Transform> {
            Err(Error::Registration("no convergence".into()))
        }
    }

    fn clouds(n: usize) -> Vec<PointCloud> {
        vec![PointCloud::new(); n]
    }

    #[test]
    fn test_empty_input_empty_output() {
        let algorithm = FixedStep {
            step: Transform::identity(),
        };
        let trajectory = estimate_trajectory(&algorithm, &[]).unwrap();
        assert!(trajectory.is_empty());
    }

    #[test]
    fn test_single_cloud_is_identity() {
        let algorithm = FixedStep {
            step: Transform::from_parts(Matrix3::identity(), Vector3::new(9.0, 9.0, 9.0)),
        };
        let trajectory = estimate_trajectory(&algorithm, &clouds(1)).unwrap();
        assert_eq!(trajectory, vec![Transform::identity()]);
    }

    #[test]
    fn test_composition_law() {
        let step = Transform::from_parts(
            nalgebra::Rotation3::from_axis_angle(&Vector3::z_axis(), 0.1).into_inner(),
            Vector3::new(1.0, 0.0, 0.0),
        );
        let algorithm = FixedStep { step };

        let trajectory = estimate_trajectory(&algorithm, &clouds(5)).unwrap();
        assert_eq!(trajectory.len(), 5);

        // estimated[i] == step^i
        let mut expected = Transform::identity();
        for estimated in &trajectory {
            assert_eq!(*estimated, expected);
            expected = expected.compose(&step);
        }
    }

    #[test]
    fn test_pairwise_failure_fails_sample() {
        let result = estimate_trajectory(&AlwaysFails, &clouds(3));
        assert!(result.is_err());
    }
}
