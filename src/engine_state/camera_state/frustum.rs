//! View-frustum planes and the axis-aligned boxes tested against them.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point3<f32>,
    /// Maximum corner
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from its two corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }
}

/// A plane `normal · p + distance = 0`; points with a positive value are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Plane {
    normal: Vector3<f32>,
    distance: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let normal = row.truncate();
        let length = normal.magnitude();
        Self {
            normal: normal / length,
            distance: row.w / length,
        }
    }

    fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(Vector3::new(point.x, point.y, point.z)) + self.distance
    }
}

/// The six planes bounding what a camera can see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes of a `projection * view` matrix with a `[0, 1]` depth range.
    pub fn from_view_projection(view_projection: &Matrix4<f32>) -> Self {
        let m = view_projection;
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));

        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    /// Whether a point lies inside every plane.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Conservative box test: `false` only if the box is entirely outside one plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let farthest = Point3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            plane.signed_distance(farthest) >= 0.0
        })
    }
}
