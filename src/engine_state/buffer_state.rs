//! # Buffer State Module
//!
//! This module provides a centralized system for managing GPU buffers in the voxel engine.
//! It handles buffer creation, writing, release and analytics so GPU memory use stays visible.
//!
//! ## Key Features
//!
//! * Named uniform buffers (camera, per-draw model transforms)
//! * Handle-addressed mesh buffers owned on behalf of chunks
//! * Buffer usage analytics and memory tracking
//! * Per-pass draw command recording, replayed by the pipeline manager
//!
//! ## Architecture
//!
//! `BufferState` implements [`RenderBackend`], so chunks upload and draw through it without
//! ever touching the device. Draws are not encoded immediately: each `draw_indexed` call is
//! recorded as a [`DrawCommand`] against the pass selected with [`BufferState::begin_pass`],
//! together with the dynamic offset of the model transform that was current at that time.
//! Once every pass has been recorded, [`BufferState::flush_model_uniforms`] uploads all model
//! transforms in one write and the pipeline manager replays the commands.

use std::collections::HashMap;

use cgmath::{Matrix4, SquareMatrix};
use log::{debug, warn};
use wgpu::{util::DeviceExt, Buffer, Device, Queue};

use super::{
    rendering::{
        backend::{BufferHandle, RenderBackend},
        vertex::Vertex,
    },
    voxels::block::ShaderPass,
};
use crate::error::{EngineError, Result};

/// Name of the GPU buffer holding the per-draw model transforms.
pub const MODEL_BUFFER_NAME: &str = "model_buffer";

/// Analytics data for a GPU buffer
///
/// Tracks memory allocation, usage, and write operations for a buffer.
#[derive(Debug, Clone, Copy)]
struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    allocated_memory: u64,
    /// Actual memory used in the buffer in bytes (based on writes)
    used_memory: u64,
    /// Number of times the buffer has been written to
    times_written: u64,
}

impl BufferAnalytics {
    fn initialized(size: u64) -> Self {
        Self {
            allocated_memory: size,
            used_memory: size,
            times_written: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BufferKey {
    Named(&'static str),
    Mesh(BufferHandle),
}

/// Model matrix as laid out in the uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    model: [[f32; 4]; 4],
}

impl From<Matrix4<f32>> for ModelUniform {
    fn from(model: Matrix4<f32>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

/// One recorded indexed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    /// Vertex buffer to bind
    pub vertex_buffer: BufferHandle,
    /// Index buffer to bind
    pub index_buffer: BufferHandle,
    /// Number of indices to draw
    pub index_count: u32,
    /// Dynamic offset into the model buffer
    pub model_offset: u32,
}

/// Rounds `size` up to the next multiple of `alignment`.
pub fn align_to(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

/// Central manager for GPU buffers in the voxel engine
///
/// Provides a registry for creating, accessing, and writing to GPU buffers.
/// Named buffers are referenced by a static string, mesh buffers by [`BufferHandle`].
pub struct BufferState {
    /// The GPU device
    pub device: Device,
    /// The GPU command queue
    pub queue: Queue,
    buffers: HashMap<&'static str, Buffer>,
    mesh_buffers: HashMap<BufferHandle, Buffer>,
    buffer_analytics: HashMap<BufferKey, BufferAnalytics>,
    next_handle: u64,
    max_buffer_size: u64,
    model_uniform_stride: u64,
    model_uniforms: Vec<ModelUniform>,
    current_model: Option<u32>,
    current_pass: ShaderPass,
    draw_commands: [Vec<DrawCommand>; ShaderPass::COUNT],
}

impl BufferState {
    /// Creates a new buffer state manager
    ///
    /// # Arguments
    ///
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    ///
    /// # Returns
    ///
    /// A new `BufferState` instance with empty buffer collections
    pub fn new(device: Device, queue: Queue) -> Self {
        let limits = device.limits();
        let model_uniform_stride = align_to(
            std::mem::size_of::<ModelUniform>() as u64,
            u64::from(limits.min_uniform_buffer_offset_alignment),
        );

        Self {
            device,
            queue,
            buffers: HashMap::new(),
            mesh_buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
            next_handle: 0,
            max_buffer_size: limits.max_buffer_size,
            model_uniform_stride,
            model_uniforms: Vec::new(),
            current_model: None,
            current_pass: ShaderPass::Opaque,
            draw_commands: Default::default(),
        }
    }

    /// Creates a named buffer and initializes it with data
    ///
    /// An existing buffer with the same name is replaced.
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) -> Result<()> {
        self.check_size(buffer_name, init_descriptor.contents.len() as u64)?;

        let buffer = self.device.create_buffer_init(&init_descriptor);
        if let Some(old) = self.buffers.insert(buffer_name, buffer) {
            old.destroy();
        }
        self.buffer_analytics.insert(
            BufferKey::Named(buffer_name),
            BufferAnalytics::initialized(init_descriptor.contents.len() as u64),
        );
        Ok(())
    }

    /// Writes raw byte data to a named buffer
    ///
    /// Writes to unknown buffers or past the end of a buffer are dropped with a warning.
    pub fn write_buffer(&mut self, buffer_name: &'static str, offset: wgpu::BufferAddress, data: &[u8]) {
        let (Some(buffer), Some(analytics)) = (
            self.buffers.get(buffer_name),
            self.buffer_analytics.get_mut(&BufferKey::Named(buffer_name)),
        ) else {
            warn!("Write to unknown buffer '{}' dropped", buffer_name);
            return;
        };

        let data_size = data.len() as u64;
        if offset + data_size > analytics.allocated_memory {
            warn!(
                "Buffer write out of bounds for buffer name '{}' ({} + {} > {})",
                buffer_name, offset, data_size, analytics.allocated_memory
            );
            return;
        }

        self.queue.write_buffer(buffer, offset, data);
        analytics.used_memory = analytics.used_memory.max(offset + data_size);
        analytics.times_written += 1;
    }

    /// Gets a reference to a named buffer
    pub fn get_buffer(&self, buffer_name: &'static str) -> Option<&Buffer> {
        self.buffers.get(buffer_name)
    }

    /// Gets a reference to a mesh buffer
    pub fn mesh_buffer(&self, handle: BufferHandle) -> Option<&Buffer> {
        self.mesh_buffers.get(&handle)
    }

    /// Number of mesh buffers currently alive.
    pub fn mesh_buffer_count(&self) -> usize {
        self.mesh_buffers.len()
    }

    /// Gets the total allocated memory across all buffers
    pub fn total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.allocated_memory)
            .sum()
    }

    /// Gets the total used memory across all buffers
    pub fn total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.used_memory)
            .sum()
    }

    /// Total number of writes issued to named buffers.
    pub fn total_writes(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.times_written)
            .sum()
    }

    /// Byte distance between consecutive model transforms in the model buffer.
    pub fn model_uniform_stride(&self) -> u64 {
        self.model_uniform_stride
    }

    /// Discards the draws and model transforms recorded for the previous frame.
    pub fn begin_frame(&mut self) {
        self.model_uniforms.clear();
        self.current_model = None;
        self.draw_commands.iter_mut().for_each(Vec::clear);
    }

    /// Directs subsequent draws to `pass`.
    pub fn begin_pass(&mut self, pass: ShaderPass) {
        self.current_pass = pass;
    }

    /// Draws recorded for `pass` this frame.
    pub fn draw_commands(&self, pass: ShaderPass) -> &[DrawCommand] {
        &self.draw_commands[pass.index()]
    }

    /// Uploads every model transform recorded this frame.
    ///
    /// # Returns
    /// `true` if the model buffer was recreated, which invalidates bind groups that reference it.
    pub fn flush_model_uniforms(&mut self) -> Result<bool> {
        let stride = self.model_uniform_stride as usize;
        let needed = (self.model_uniforms.len().max(1) * stride) as u64;

        let capacity = self
            .buffer_analytics
            .get(&BufferKey::Named(MODEL_BUFFER_NAME))
            .map(|analytics| analytics.allocated_memory);
        let grown = match capacity {
            Some(capacity) if capacity >= needed => false,
            _ => {
                let slots = self.model_uniforms.len().max(1).next_power_of_two();
                let contents = vec![0u8; slots * stride];
                self.create_buffer_init(
                    MODEL_BUFFER_NAME,
                    wgpu::util::BufferInitDescriptor {
                        label: Some(MODEL_BUFFER_NAME),
                        contents: &contents,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    },
                )?;
                debug!("Model buffer grown to {} slots", slots);
                true
            }
        };

        if !self.model_uniforms.is_empty() {
            let mut bytes = vec![0u8; self.model_uniforms.len() * stride];
            for (slot, uniform) in bytes.chunks_exact_mut(stride).zip(&self.model_uniforms) {
                let raw = bytemuck::bytes_of(uniform);
                slot[..raw.len()].copy_from_slice(raw);
            }
            self.write_buffer(MODEL_BUFFER_NAME, 0, &bytes);
        }

        Ok(grown)
    }

    fn check_size(&self, label: &str, requested: u64) -> Result<()> {
        if requested > self.max_buffer_size {
            return Err(EngineError::BufferTooLarge {
                label: label.to_string(),
                requested,
                limit: self.max_buffer_size,
            });
        }
        Ok(())
    }

    fn create_mesh_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<BufferHandle> {
        self.check_size(label, contents.len() as u64)?;

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            });

        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        self.mesh_buffers.insert(handle, buffer);
        self.buffer_analytics.insert(
            BufferKey::Mesh(handle),
            BufferAnalytics::initialized(contents.len() as u64),
        );
        Ok(handle)
    }

    fn push_model(&mut self, model: Matrix4<f32>) -> u32 {
        let index = self.model_uniforms.len() as u32;
        self.model_uniforms.push(model.into());
        self.current_model = Some(index);
        index
    }
}

impl RenderBackend for BufferState {
    fn create_vertex_buffer(&mut self, label: &str, vertices: &[Vertex]) -> Result<BufferHandle> {
        self.create_mesh_buffer(
            label,
            bytemuck::cast_slice(vertices),
            wgpu::BufferUsages::VERTEX,
        )
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> Result<BufferHandle> {
        self.create_mesh_buffer(
            label,
            bytemuck::cast_slice(indices),
            wgpu::BufferUsages::INDEX,
        )
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        if let Some(buffer) = self.mesh_buffers.remove(&handle) {
            buffer.destroy();
            self.buffer_analytics.remove(&BufferKey::Mesh(handle));
        }
    }

    fn set_model_transform(&mut self, model: Matrix4<f32>) {
        self.push_model(model);
    }

    fn draw_indexed(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
        index_count: u32,
    ) {
        let model = match self.current_model {
            Some(model) => model,
            None => self.push_model(Matrix4::identity()),
        };

        let command = DrawCommand {
            vertex_buffer,
            index_buffer,
            index_count,
            model_offset: (u64::from(model) * self.model_uniform_stride) as u32,
        };
        self.draw_commands[self.current_pass.index()].push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_stride_respects_the_uniform_alignment() {
        let size = std::mem::size_of::<ModelUniform>() as u64;
        assert_eq!(size, 64);
        assert_eq!(align_to(size, 256), 256);
        assert_eq!(align_to(size, 64), 64);
        assert_eq!(align_to(size, 48), 96);
        assert_eq!(align_to(size, 0), 64);
    }

    #[test]
    fn model_uniform_is_column_major() {
        let translation = Matrix4::from_translation(cgmath::Vector3::new(16.0, 32.0, 48.0));
        let uniform = ModelUniform::from(translation);

        assert_eq!(uniform.model[3], [16.0, 32.0, 48.0, 1.0]);
    }
}
