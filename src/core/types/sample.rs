//! Labeled sample type: point clouds with ground-truth poses.

use crate::error::{Error, Result};

use super::point_cloud::PointCloud;
use super::transform::Transform;

/// A loaded sequence of point clouds with aligned ground-truth world poses.
///
/// `world_transforms()[i]` is the absolute pose of `point_clouds()[i]`. The
/// two sequences always have equal length; the constructor rejects anything
/// else. Samples are immutable after load and shared read-only across
/// concurrent evaluation tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    point_clouds: Vec<PointCloud>,
    world_transforms: Vec<Transform>,
}

impl Sample {
    /// Create a sample from index-aligned clouds and poses.
    pub fn new(point_clouds: Vec<PointCloud>, world_transforms: Vec<Transform>) -> Result<Self> {
        if point_clouds.len() != world_transforms.len() {
            return Err(Error::Dataset(format!(
                "point cloud and pose counts differ: {} vs {}",
                point_clouds.len(),
                world_transforms.len()
            )));
        }
        Ok(Self {
            point_clouds,
            world_transforms,
        })
    }

    /// Point clouds in load order.
    #[inline]
    pub fn point_clouds(&self) -> &[PointCloud] {
        &self.point_clouds
    }

    /// Ground-truth world poses, index-aligned with the clouds.
    #[inline]
    pub fn world_transforms(&self) -> &[Transform] {
        &self.world_transforms
    }

    /// Number of steps in the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.point_clouds.len()
    }

    /// Whether the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.point_clouds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_length_mismatch() {
        let result = Sample::new(vec![PointCloud::new()], Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_aligned_sequences() {
        let sample = Sample::new(
            vec![PointCloud::new(), PointCloud::new()],
            vec![Transform::identity(), Transform::identity()],
        )
        .unwrap();
        assert_eq!(sample.len(), 2);
        assert!(!sample.is_empty());
    }
}
