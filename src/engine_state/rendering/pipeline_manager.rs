//! Manages the WebGPU render pipelines and executes the recorded chunk draws.
//!
//! # Architecture
//!
//! - One pipeline per [`ShaderPass`], built from the same shader and layout
//! - The opaque pipeline replaces colour and writes depth
//! - The transparent pipeline alpha-blends and only tests depth, so water never hides what is
//!   behind it
//!
//! Both passes share a single render pass: every opaque command is replayed before any
//! transparent one.

use wgpu::{Device, RenderPipeline, Surface, SurfaceConfiguration, TextureFormat};

use super::{bind_group_state::BindGroupState, texture, vertex::Vertex};
use crate::{
    engine_state::{buffer_state::BufferState, voxels::block::ShaderPass},
    error::Result,
};

/// Sky colour the frame is cleared to.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.392,
    g: 0.584,
    b: 0.929,
    a: 1.0,
};

/// Owns the chunk pipelines and the depth buffer.
pub struct PipelineManager {
    /// Pipelines indexed by [`ShaderPass::index`]
    render_pipelines: [RenderPipeline; ShaderPass::COUNT],
    /// Depth texture used for depth testing
    pub depth_texture: texture::Texture,
}

impl PipelineManager {
    /// Creates both chunk pipelines and the depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - Surface configuration containing size and format
    /// * `bind_group_state` - Layouts for the camera, atlas and model groups
    /// * `shader_string` - The WGSL shader source code
    pub fn new(
        device: &Device,
        config: &SurfaceConfiguration,
        bind_group_state: &BindGroupState,
        shader_string: &str,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chunk Render Pipeline Layout"),
            bind_group_layouts: &[
                &bind_group_state.camera_bind_group_layout,
                &bind_group_state.texture_bind_group_layout,
                &bind_group_state.model_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Chunk Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipelines = ShaderPass::ALL.map(|pass| {
            Self::create_pipeline(device, &pipeline_layout, &shader, config.format, pass)
        });

        let depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        Self {
            render_pipelines,
            depth_texture,
        }
    }

    fn create_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        texture_format: TextureFormat,
        pass: ShaderPass,
    ) -> RenderPipeline {
        let (label, blend, depth_write_enabled) = match pass {
            ShaderPass::Opaque => ("Opaque Chunk Pipeline", wgpu::BlendState::REPLACE, true),
            ShaderPass::Transparent => (
                "Transparent Chunk Pipeline",
                wgpu::BlendState::ALPHA_BLENDING,
                false,
            ),
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::Texture::DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Renders a frame to the given surface.
    ///
    /// 1. Acquires the next frame from the surface
    /// 2. Clears colour and depth
    /// 3. Replays the recorded draws of each pass with its pipeline
    /// 4. Submits commands to the GPU and presents the frame
    pub fn render(
        &self,
        surface: &Surface,
        device: &Device,
        queue: &wgpu::Queue,
        bind_group_state: &BindGroupState,
        buffer_state: &BufferState,
    ) -> Result<()> {
        let frame = surface.get_current_texture()?;

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Chunk Encoder"),
        });
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chunk Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            rpass.set_bind_group(0, &bind_group_state.camera_bind_group, &[]);
            rpass.set_bind_group(1, &bind_group_state.texture_bind_group, &[]);

            for pass in ShaderPass::ALL {
                rpass.set_pipeline(&self.render_pipelines[pass.index()]);

                for command in buffer_state.draw_commands(pass) {
                    let (Some(vertex_buffer), Some(index_buffer)) = (
                        buffer_state.mesh_buffer(command.vertex_buffer),
                        buffer_state.mesh_buffer(command.index_buffer),
                    ) else {
                        continue;
                    };

                    rpass.set_bind_group(
                        2,
                        &bind_group_state.model_bind_group,
                        &[command.model_offset],
                    );
                    rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
                    rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..command.index_count, 0, 0..1);
                }
            }
        }

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Handles window resize events by recreating the depth texture.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}
