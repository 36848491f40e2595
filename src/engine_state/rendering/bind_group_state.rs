//! Manages WebGPU bind groups and their layouts.
//!
//! This module creates the three bind groups the chunk shader reads:
//!
//! | Group | Contents | Notes |
//! |-------|----------|-------|
//! | 0 | camera uniform | vertex and fragment stages |
//! | 1 | block atlas and sampler | fragment stage |
//! | 2 | model transform | dynamic offset, one slot per draw |

use image::RgbaImage;
use wgpu::{BindGroup, BindGroupLayout, Device, Queue};

use super::texture::Texture;
use crate::{
    engine_state::{
        buffer_state::{BufferState, ModelUniform, MODEL_BUFFER_NAME},
        camera_state::CAMERA_BUFFER_NAME,
    },
    error::{EngineError, Result},
};

/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
/// Name of the texture bind group
pub const TEXTURE_BIND_GROUP: &str = "texture_bind_group";
/// Name of the texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "texture_bind_group_layout";
/// Name of the model bind group
pub const MODEL_BIND_GROUP: &str = "model_bind_group";
/// Name of the model bind group layout
pub const MODEL_BIND_GROUP_LAYOUT: &str = "model_bind_group_layout";

/// Bind groups and layouts shared by both chunk pipelines.
pub struct BindGroupState {
    /// Camera uniform group
    pub camera_bind_group: BindGroup,
    /// Layout of [`Self::camera_bind_group`]
    pub camera_bind_group_layout: BindGroupLayout,
    /// Atlas texture and sampler group
    pub texture_bind_group: BindGroup,
    /// Layout of [`Self::texture_bind_group`]
    pub texture_bind_group_layout: BindGroupLayout,
    /// Per-draw model transform group
    pub model_bind_group: BindGroup,
    /// Layout of [`Self::model_bind_group`]
    pub model_bind_group_layout: BindGroupLayout,
    // Held so the atlas outlives the bind group that samples it
    _atlas: Texture,
}

impl BindGroupState {
    /// Creates every bind group.
    ///
    /// The camera and model buffers must already exist in `buffer_state`.
    pub fn new(
        device: &Device,
        queue: &Queue,
        buffer_state: &BufferState,
        atlas: &RgbaImage,
    ) -> Result<Self> {
        let (camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(device, buffer_state)?;

        let atlas = Texture::from_image(device, queue, atlas, "Block Atlas");
        let (texture_bind_group, texture_bind_group_layout) =
            Self::generate_texture_bindgroups(device, &atlas);

        let model_bind_group_layout = Self::generate_model_bind_group_layout(device);
        let model_bind_group =
            Self::generate_model_bind_group(device, &model_bind_group_layout, buffer_state)?;

        Ok(Self {
            camera_bind_group,
            camera_bind_group_layout,
            texture_bind_group,
            texture_bind_group_layout,
            model_bind_group,
            model_bind_group_layout,
            _atlas: atlas,
        })
    }

    /// Recreates the model bind group after the model buffer was reallocated.
    pub fn rebuild_model_bind_group(
        &mut self,
        device: &Device,
        buffer_state: &BufferState,
    ) -> Result<()> {
        self.model_bind_group =
            Self::generate_model_bind_group(device, &self.model_bind_group_layout, buffer_state)?;
        Ok(())
    }

    /// Creates bind groups for camera uniforms.
    fn generate_camera_bindgroups(
        device: &Device,
        buffer_state: &BufferState,
    ) -> Result<(BindGroup, BindGroupLayout)> {
        let camera_buffer = buffer_state
            .get_buffer(CAMERA_BUFFER_NAME)
            .ok_or(EngineError::MissingBuffer(CAMERA_BUFFER_NAME))?;

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some(CAMERA_BIND_GROUP_LAYOUT),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        Ok((camera_bind_group, camera_bind_group_layout))
    }

    /// Creates the atlas bind group.
    fn generate_texture_bindgroups(device: &Device, atlas: &Texture) -> (BindGroup, BindGroupLayout) {
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        // This should match the filterable field of the corresponding Texture entry above.
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some(TEXTURE_BIND_GROUP_LAYOUT),
            });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        });

        (texture_bind_group, texture_bind_group_layout)
    }

    fn generate_model_bind_group_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ModelUniform>() as u64,
                    ),
                },
                count: None,
            }],
            label: Some(MODEL_BIND_GROUP_LAYOUT),
        })
    }

    /// Binds one model-sized window of the model buffer; draws select the slot by offset.
    fn generate_model_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        buffer_state: &BufferState,
    ) -> Result<BindGroup> {
        let model_buffer = buffer_state
            .get_buffer(MODEL_BUFFER_NAME)
            .ok_or(EngineError::MissingBuffer(MODEL_BUFFER_NAME))?;

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: model_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniform>() as u64),
                }),
            }],
            label: Some(MODEL_BIND_GROUP),
        }))
    }
}
