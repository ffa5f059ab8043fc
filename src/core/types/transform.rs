//! Rigid transform type for 3D registration.

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 4×4 homogeneous rigid transform (rotation + translation).
///
/// Used both as pairwise algorithm output (relative, source frame → target
/// frame) and as ground truth (absolute, world frame). Composition is matrix
/// multiplication with [`Transform::identity`] as the neutral element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    #[inline]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create from a full 4×4 homogeneous matrix.
    ///
    /// The caller is responsible for the matrix being rigid (orthonormal
    /// rotation block, bottom row `0 0 0 1`); no normalization is applied.
    #[inline]
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Create from a rotation block and a translation vector.
    pub fn from_parts(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        let mut matrix = Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        Self { matrix }
    }

    /// The underlying 4×4 matrix.
    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// The 3×3 rotation block.
    #[inline]
    pub fn rotation(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation part.
    #[inline]
    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Compose two transforms: `self * other`.
    ///
    /// Applies `other` first, then `self`. Chaining relative-to-previous
    /// transforms onto an accumulated pose builds an absolute trajectory.
    #[inline]
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Inverse of this transform.
    ///
    /// Computed from the rigid structure (`R⁻¹ = Rᵀ`) rather than a general
    /// matrix inversion.
    pub fn inverse(&self) -> Transform {
        let rotation_t = self.rotation().transpose();
        let translation = -(rotation_t * self.translation());
        Self::from_parts(rotation_t, translation)
    }

    /// Rotation angle of this transform in radians, in [0, π].
    ///
    /// The geodesic angle of the rotation block: `acos((trace(R) - 1) / 2)`,
    /// with the cosine clamped against numerical drift.
    pub fn rotation_angle(&self) -> f64 {
        let rotation = self.rotation();
        let cos_theta = ((rotation.trace() - 1.0) * 0.5).clamp(-1.0, 1.0);
        cos_theta.acos()
    }

    /// Transform a point.
    #[inline]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation() * point.coords + self.translation())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
