//! Geometric primitives shared by the builder and the exporter.
//!
//! # Overview
//!
//! - [`PlanPoint`] - A 2D coordinate in floor-plan space
//! - [`Transform`] - A node's local transform (4x4 affine matrix)
//!
//! # Coordinate System
//!
//! Floor plans are authored top-down with `x` to the right and `y` "up" the
//! page. The 3D scene is Y-up; a plan point maps onto the ground plane as:
//!
//! ```text
//!   plan (x, y)  ──►  world (x, 0, -y)
//!
//!        +Y (up)
//!         │
//!         │
//!         └──────► +X
//!        ╱
//!       ╱
//!     +Z (towards the viewer, i.e. plan -y)
//! ```

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};

/// Lengths at or below this are treated as zero.
pub const EPSILON: f64 = 1e-6;

/// A 2D point in floor-plan coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanPoint {
    x: f64,
    y: f64,
}

impl PlanPoint {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Vector from this point to `other`
    pub fn to(self, other: PlanPoint) -> PlanPoint {
        PlanPoint::new(other.x - self.x, other.y - self.y)
    }

    /// Euclidean length when the point is read as a vector
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(self, other: PlanPoint, t: f64) -> PlanPoint {
        PlanPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: PlanPoint) -> PlanPoint {
        self.lerp(other, 0.5)
    }

    /// Maps the point onto the world ground plane at height `elevation`.
    pub fn to_world(self, elevation: f64) -> Vector3<f32> {
        Vector3::new(self.x as f32, elevation as f32, -self.y as f32)
    }

    /// Yaw about the world Y axis that turns local +X towards `other`.
    ///
    /// With this yaw, a node's local X axis runs along the plan segment
    /// `self -> other` once mapped to world space.
    pub fn yaw_towards(self, other: PlanPoint) -> f64 {
        let dir = self.to(other);
        dir.y.atan2(dir.x)
    }
}

/// Local transform of a scene node.
///
/// Stored as a full 4x4 matrix so that any transform coming from outside the
/// builder (or a corrupted one) can be inspected with [`Transform::is_finite`]
/// before it is composed into world space.
///
/// # Examples
///
/// ```
/// # use storey_core::geometry::Transform;
/// let t = Transform::from_translation(1.0, 2.0, 3.0);
/// assert_eq!(t.transform_point([0.0, 0.0, 0.0]), [1.0, 2.0, 3.0]);
/// assert!(Transform::identity().is_identity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(x, y, z)),
        }
    }

    /// Rotation of `yaw` radians about the world Y axis followed by a
    /// translation to `translation`.
    pub fn from_yaw_translation(yaw: f64, translation: Vector3<f32>) -> Self {
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), yaw as f32);
        let matrix = Matrix4::new_translation(&translation) * rotation.to_homogeneous();
        Self { matrix }
    }

    /// Returns the underlying column-major matrix
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    /// Returns `self * child`, i.e. `child` expressed in this transform's parent space.
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            matrix: self.matrix * child.matrix,
        }
    }

    /// Checks that every matrix element is finite
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }

    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let out = self
            .matrix
            .transform_point(&Point3::new(p[0], p[1], p[2]));
        [out.x, out.y, out.z]
    }

    /// Transforms a direction (ignores translation), without renormalizing.
    pub fn transform_vector(&self, v: [f32; 3]) -> [f32; 3] {
        let out = self.matrix.transform_vector(&Vector3::new(v[0], v[1], v[2]));
        [out.x, out.y, out.z]
    }

    /// Transforms a surface normal with the inverse-transpose of the linear
    /// part and renormalizes it.
    ///
    /// Falls back to the linear part itself when it is not invertible.
    pub fn transform_normal(&self, n: [f32; 3]) -> [f32; 3] {
        let normal_matrix = self.normal_matrix();
        let out = normal_matrix * Vector3::new(n[0], n[1], n[2]);
        let len = out.norm();
        if len > 0.0 && len.is_finite() {
            [out.x / len, out.y / len, out.z / len]
        } else {
            [out.x, out.y, out.z]
        }
    }

    fn normal_matrix(&self) -> Matrix3<f32> {
        let linear: Matrix3<f32> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(linear)
    }
}
