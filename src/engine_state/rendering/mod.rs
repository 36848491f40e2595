//! Rendering system for the voxel engine.
//!
//! This module contains the core rendering functionality: mesh generation, the render backend
//! contract, pipeline setup and the per-frame render loop. [`Renderer`] is the GPU-side entry
//! point; everything below it is reachable without a window through
//! [`backend::HeadlessBackend`].
//!
//! # Frame flow
//!
//! 1. The camera uniform is uploaded and the view frustum extracted
//! 2. For each pass the world records the draws of every visible chunk, rebuilding dirty
//!    meshes on the way
//! 3. All model transforms are uploaded in one write
//! 4. The pipeline manager replays the recorded draws into a single render pass

use std::path::Path;

use log::{debug, warn};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use super::{
    buffer_state::BufferState,
    camera_state::{camera::Camera, CameraState},
    voxels::{
        block::ShaderPass,
        world::{DrawStats, World},
    },
};
use crate::{
    config::CameraConfig,
    error::{EngineError, Result},
};

pub mod backend;
pub mod bind_group_state;
pub mod meshing;
pub mod pipeline_manager;
pub mod texture;
pub mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;

use bind_group_state::BindGroupState;
use pipeline_manager::PipelineManager;

/// Chunk shader source, shared by both pipelines.
pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");

/// Draw statistics of one rendered frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Opaque pass counters
    pub opaque: DrawStats,
    /// Transparent pass counters
    pub transparent: DrawStats,
}

impl FrameStats {
    /// Indexed draws issued across both passes.
    pub fn draw_calls(&self) -> usize {
        self.opaque.draw_calls + self.transparent.draw_calls
    }
}

/// Manages the entire rendering pipeline for the voxel engine.
///
/// It owns the WebGPU surface, device, queue and every GPU resource derived from them.
pub struct Renderer {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    pub device: Device,
    /// The WebGPU queue for submitting command buffers
    pub queue: Queue,
    /// Buffer registry and draw recorder
    pub buffer_state: BufferState,
    /// Camera, atlas and model bind groups
    pub bind_group_state: BindGroupState,
    /// Chunk pipelines and depth buffer
    pub pipeline_manager: PipelineManager,
    /// Projection and camera uniform
    pub camera_state: CameraState,
}

impl Renderer {
    /// Creates every GPU resource needed to draw the world.
    ///
    /// The surface must already be configured with `surface_config`.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        camera_config: &CameraConfig,
    ) -> Result<Self> {
        let mut buffer_state = BufferState::new(device.clone(), queue.clone());
        let camera_state = CameraState::new(
            &mut buffer_state,
            surface_config.width,
            surface_config.height,
            camera_config,
        )?;
        buffer_state.flush_model_uniforms()?;

        let atlas = texture::load_atlas_image(Path::new(texture::ATLAS_PATH))?;
        let bind_group_state = BindGroupState::new(&device, &queue, &buffer_state, &atlas)?;
        let pipeline_manager =
            PipelineManager::new(&device, &surface_config, &bind_group_state, SHADER_SOURCE);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            buffer_state,
            bind_group_state,
            pipeline_manager,
            camera_state,
        })
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration, camera projection, and depth buffer to match the new
    /// window size. A zero-sized window is ignored.
    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);

        self.camera_state.resize(size.width, size.height);
        self.pipeline_manager
            .resize(&self.device, &self.surface_config);
    }

    /// Replaces the projection settings.
    pub fn apply_camera_config(&mut self, config: &CameraConfig) {
        self.camera_state
            .apply_config(self.surface_config.width, self.surface_config.height, config);
    }

    /// Renders one frame of `world` as seen from `camera`.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, world: &World, camera: &Camera) -> Result<FrameStats> {
        let frustum = self.camera_state.update(&mut self.buffer_state, camera);

        self.buffer_state.begin_frame();
        let mut stats = FrameStats::default();
        for pass in ShaderPass::ALL {
            self.buffer_state.begin_pass(pass);
            let pass_stats = world.draw(&mut self.buffer_state, pass, Some(&frustum))?;
            match pass {
                ShaderPass::Opaque => stats.opaque = pass_stats,
                ShaderPass::Transparent => stats.transparent = pass_stats,
            }
        }

        if self.buffer_state.flush_model_uniforms()? {
            self.bind_group_state
                .rebuild_model_bind_group(&self.device, &self.buffer_state)?;
        }

        match self.pipeline_manager.render(
            &self.surface,
            &self.device,
            &self.queue,
            &self.bind_group_state,
            &self.buffer_state,
        ) {
            Ok(()) => Ok(stats),
            Err(EngineError::SurfaceAcquire(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                Ok(stats)
            }
            Err(err) => Err(err),
        }
    }

    /// Frees every chunk mesh of `world`, for example before the world is regenerated.
    pub fn release_world(&mut self, world: &World) {
        world.release_meshes(&mut self.buffer_state);
        debug!(
            "Released world meshes, {} mesh buffers remain",
            self.buffer_state.mesh_buffer_count()
        );
    }
}
