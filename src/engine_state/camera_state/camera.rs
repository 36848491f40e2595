//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and transformations
//! - Projection matrix handling
//! - GPU uniform layout
//!
//! ## Key Components
//! - `Camera`: Position and rotation in world space
//! - `Projection`: Perspective projection settings
//! - `CameraUniform`: Packed data structure for GPU shaders

use cgmath::*;

use super::frustum::Frustum;
use crate::config::CameraConfig;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU uses a coordinate system where:
/// - X is right
/// - Y is up
/// - NDC (Normalized Device Coordinates) range from -1 to 1 in X and Y, and 0 to 1 in Z
///
/// This matrix performs two main transformations:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// A first-person camera in 3D space.
///
/// With an identity rotation the camera looks down `-Z` with `+Y` up and `+X` to the right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Orientation relative to looking down `-Z`
    pub rotation: Quaternion<f32>,
}

impl Camera {
    /// Creates a camera at `position` with an identity rotation.
    pub fn new<V: Into<Point3<f32>>>(position: V) -> Self {
        Self {
            position: position.into(),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    /// Creates a camera from yaw (about `+Y`) and pitch (about `+X`).
    pub fn from_yaw_pitch<V, Y, P>(position: V, yaw: Y, pitch: P) -> Self
    where
        V: Into<Point3<f32>>,
        Y: Into<Rad<f32>>,
        P: Into<Rad<f32>>,
    {
        let mut camera = Self::new(position);
        camera.set_yaw_pitch(yaw, pitch);
        camera
    }

    /// Replaces the rotation with yaw about `+Y` applied after pitch about `+X`.
    pub fn set_yaw_pitch<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(&mut self, yaw: Y, pitch: P) {
        self.rotation = Quaternion::from_angle_y(yaw.into()) * Quaternion::from_angle_x(pitch.into());
    }

    /// Normalized viewing direction.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(-Vector3::unit_z())
    }

    /// Normalized direction to the camera's right.
    pub fn right(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_x())
    }

    /// Normalized direction of the camera's up.
    pub fn up(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    /// Calculates the view matrix for this camera.
    ///
    /// The view matrix transforms world coordinates to view (camera) space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), self.up())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// This handles the perspective projection used to render the 3D scene.
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: Self::aspect_of(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Creates a projection for a viewport from the camera settings.
    pub fn from_config(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self::new(
            width,
            height,
            Deg(config.fov_degrees),
            config.znear,
            config.zfar,
        )
    }

    fn aspect_of(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    ///
    /// A zero-sized viewport (minimized window) is treated as one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_of(width, height);
    }

    /// Aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix.
    ///
    /// Combines the perspective projection with the OpenGL to WGPU coordinate system transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Combined `projection * view` matrix of a camera.
pub fn view_projection(camera: &Camera, projection: &Projection) -> Matrix4<f32> {
    projection.calc_matrix() * camera.calc_matrix()
}

/// GPU-friendly representation of camera data for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // cgmath types are not Pod, so matrices travel as plain arrays
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraUniform {
    /// Creates a new camera uniform with an identity matrix and zero position.
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Updates the view-projection matrix and position from the camera.
    ///
    /// # Returns
    /// The frustum of the new view-projection matrix.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) -> Frustum {
        let view_proj = view_projection(camera, projection);
        self.view_proj = view_proj.into();
        self.position = camera.position.to_homogeneous().into();
        Frustum::from_view_projection(&view_proj)
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::camera_state::frustum::Aabb;

    fn assert_close(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).magnitude() < 1e-5,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn identity_camera_looks_down_negative_z() {
        let camera = Camera::default();

        assert_close(camera.forward(), -Vector3::unit_z());
        assert_close(camera.right(), Vector3::unit_x());
        assert_close(camera.up(), Vector3::unit_y());
    }

    #[test]
    fn positive_yaw_turns_left() {
        let camera = Camera::from_yaw_pitch(Point3::origin(), Deg(90.0), Deg(0.0));

        assert_close(camera.forward(), -Vector3::unit_x());
        assert_close(camera.up(), Vector3::unit_y());
    }

    #[test]
    fn positive_pitch_looks_up() {
        let camera = Camera::from_yaw_pitch(Point3::origin(), Rad(0.0), Rad(0.5));

        assert!(camera.forward().y > 0.0);
        assert!((camera.forward().magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut projection = Projection::new(800, 600, Deg(60.0), 0.1, 100.0);
        projection.resize(400, 0);

        assert_eq!(projection.aspect(), 400.0);
    }

    #[test]
    fn frustum_keeps_what_is_in_front() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0));
        let projection = Projection::new(800, 600, Deg(60.0), 0.1, 100.0);
        let mut uniform = CameraUniform::new();
        let frustum = uniform.update_view_proj_and_pos(&camera, &projection);

        let ahead = Aabb::new(Point3::new(-1.0, -1.0, -11.0), Point3::new(1.0, 1.0, -9.0));
        let behind = Aabb::new(Point3::new(-1.0, -1.0, 9.0), Point3::new(1.0, 1.0, 11.0));
        let beyond_far = Aabb::new(
            Point3::new(-1.0, -1.0, -300.0),
            Point3::new(1.0, 1.0, -200.0),
        );
        let off_to_the_side = Aabb::new(
            Point3::new(50.0, -1.0, -6.0),
            Point3::new(52.0, 1.0, -4.0),
        );

        assert!(frustum.contains_point(Point3::new(0.0, 0.0, -5.0)));
        assert!(!frustum.contains_point(Point3::new(0.0, 0.0, 5.0)));
        assert!(frustum.intersects_aabb(&ahead));
        assert!(!frustum.intersects_aabb(&behind));
        assert!(!frustum.intersects_aabb(&beyond_far));
        assert!(!frustum.intersects_aabb(&off_to_the_side));
    }

    #[test]
    fn frustum_keeps_a_box_surrounding_the_camera() {
        let camera = Camera::from_yaw_pitch(Point3::new(8.0, 8.0, 8.0), Deg(30.0), Deg(-20.0));
        let projection = Projection::new(1280, 720, Deg(60.0), 0.05, 500.0);
        let frustum = Frustum::from_view_projection(&view_projection(&camera, &projection));

        let around = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(16.0, 16.0, 16.0));
        assert!(frustum.intersects_aabb(&around));
    }
}
