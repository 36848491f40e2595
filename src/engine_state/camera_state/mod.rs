//! # Camera State Management
//!
//! This module turns the player's [`camera::Camera`] into GPU state each frame:
//! - Projection settings and viewport resizing
//! - The camera uniform buffer read by the shaders
//! - The view frustum used to cull chunks
//!
//! ## Core Components
//! - `Camera`: position and orientation in world space, owned by the player
//! - `Projection`: perspective projection settings
//! - `CameraUniform`: GPU representation of camera data for shaders
//! - `Frustum`: clip planes extracted from the view-projection matrix

use super::buffer_state::BufferState;
use crate::{config::CameraConfig, error::Result};

pub mod camera;
pub mod frustum;

use camera::{Camera, CameraUniform, Projection};
use frustum::Frustum;

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// Projection and uniform data for the camera the frame is rendered from.
pub struct CameraState {
    /// Perspective projection for the current viewport
    pub projection: Projection,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: CameraUniform,
}

impl CameraState {
    /// Creates the camera state and its uniform buffer.
    ///
    /// # Arguments
    /// * `buffer_state` - Owner of the camera uniform buffer
    /// * `width`, `height` - Initial viewport size in pixels
    /// * `config` - Projection settings
    pub fn new(
        buffer_state: &mut BufferState,
        width: u32,
        height: u32,
        config: &CameraConfig,
    ) -> Result<Self> {
        let projection = Projection::from_config(width, height, config);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(&Camera::default(), &projection);

        buffer_state.create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        )?;

        Ok(Self {
            projection,
            camera_uniform,
        })
    }

    /// Uploads the view of `camera` and returns its frustum.
    pub fn update(&mut self, buffer_state: &mut BufferState, camera: &Camera) -> Frustum {
        let frustum = self
            .camera_uniform
            .update_view_proj_and_pos(camera, &self.projection);
        buffer_state.write_buffer(
            CAMERA_BUFFER_NAME,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
        frustum
    }

    /// Adapts the projection to a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Replaces the projection settings, keeping the current aspect ratio.
    pub fn apply_config(&mut self, width: u32, height: u32, config: &CameraConfig) {
        self.projection = Projection::from_config(width, height, config);
    }
}
