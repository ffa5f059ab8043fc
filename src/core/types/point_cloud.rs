//! Point cloud container.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::transform::Transform;

/// An ordered collection of 3D points in meters.
///
/// Immutable after dataset load; may be empty. Algorithms that cannot handle
/// empty input are expected to reject it themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    /// Points in load order
    pub points: Vec<Point3<f64>>,
}

impl PointCloud {
    /// Create an empty point cloud.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point cloud from a list of points.
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point.
    #[inline]
    pub fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
    }

    /// Return a copy of this cloud with `transform` applied to every point.
    pub fn transformed(&self, transform: &Transform) -> PointCloud {
        PointCloud {
            points: self
                .points
                .iter()
                .map(|p| transform.transform_point(p))
                .collect(),
        }
    }

    /// Centroid of the cloud, or `None` if empty.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / self.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_empty_cloud() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
        assert!(cloud.centroid().is_none());
    }

    #[test]
    fn test_centroid() {
        let cloud = PointCloud::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
        ]);
        let centroid = cloud.centroid().unwrap();
        assert_relative_eq!(centroid.x, 1.0);
        assert_relative_eq!(centroid.y, 1.0);
        assert_relative_eq!(centroid.z, 0.0);
    }

    #[test]
    fn test_transformed() {
        let cloud = PointCloud::from_points(vec![Point3::new(1.0, 2.0, 3.0)]);
        let shift = Transform::from_parts(nalgebra::Matrix3::identity(), Vector3::new(0.5, 0.0, -1.0));
        let moved = cloud.transformed(&shift);

        assert_relative_eq!(moved.points[0].x, 1.5);
        assert_relative_eq!(moved.points[0].y, 2.0);
        assert_relative_eq!(moved.points[0].z, 2.0);
    }
}
