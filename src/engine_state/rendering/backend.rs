//! # Render Backend
//!
//! The narrow contract between the voxel core and the graphics device. Chunks upload their
//! CPU-built meshes through it and issue their draws through it; they never see the device
//! itself. [`crate::engine_state::buffer_state::BufferState`] implements it on top of `wgpu`,
//! and [`HeadlessBackend`] implements it without a GPU for tests and the headless mode.

use std::collections::HashMap;

use cgmath::Matrix4;

use super::vertex::Vertex;
use crate::error::Result;

/// Opaque handle to a buffer owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Device operations the voxel core relies on.
pub trait RenderBackend {
    /// Uploads vertex data and returns a handle to the new buffer.
    fn create_vertex_buffer(&mut self, label: &str, vertices: &[Vertex]) -> Result<BufferHandle>;

    /// Uploads index data and returns a handle to the new buffer.
    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> Result<BufferHandle>;

    /// Frees a buffer. Unknown handles are ignored.
    fn release_buffer(&mut self, handle: BufferHandle);

    /// Sets the model transform used by subsequent draws.
    fn set_model_transform(&mut self, model: Matrix4<f32>);

    /// Binds the two buffers and issues an indexed draw of `index_count` indices.
    fn draw_indexed(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
        index_count: u32,
    );
}

/// Backend that keeps buffer sizes in memory and counts calls instead of drawing.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    buffers: HashMap<BufferHandle, u64>,
    /// Number of buffers created since construction
    pub buffers_created: usize,
    /// Number of buffers released since construction
    pub buffers_released: usize,
    /// Number of `draw_indexed` calls
    pub draw_calls: usize,
    /// Sum of `index_count` over every draw
    pub indices_drawn: u64,
    /// Number of model transform updates
    pub transforms_set: usize,
    /// Rejects uploads larger than this many bytes, mimicking a device limit
    pub max_buffer_size: Option<u64>,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend that rejects uploads larger than `limit` bytes.
    pub fn with_max_buffer_size(limit: u64) -> Self {
        Self {
            max_buffer_size: Some(limit),
            ..Self::default()
        }
    }

    /// Number of buffers currently alive.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Bytes held by live buffers.
    pub fn live_bytes(&self) -> u64 {
        self.buffers.values().sum()
    }

    /// Clears the per-frame counters, keeping buffers alive.
    pub fn reset_frame_counters(&mut self) {
        self.draw_calls = 0;
        self.indices_drawn = 0;
        self.transforms_set = 0;
    }

    fn allocate(&mut self, label: &str, size: u64) -> Result<BufferHandle> {
        if let Some(limit) = self.max_buffer_size {
            if size > limit {
                return Err(crate::error::EngineError::BufferTooLarge {
                    label: label.to_string(),
                    requested: size,
                    limit,
                });
            }
        }

        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        self.buffers.insert(handle, size);
        self.buffers_created += 1;
        Ok(handle)
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_vertex_buffer(&mut self, label: &str, vertices: &[Vertex]) -> Result<BufferHandle> {
        self.allocate(label, std::mem::size_of_val(vertices) as u64)
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> Result<BufferHandle> {
        self.allocate(label, std::mem::size_of_val(indices) as u64)
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle).is_some() {
            self.buffers_released += 1;
        }
    }

    fn set_model_transform(&mut self, _model: Matrix4<f32>) {
        self.transforms_set += 1;
    }

    fn draw_indexed(
        &mut self,
        _vertex_buffer: BufferHandle,
        _index_buffer: BufferHandle,
        index_count: u32,
    ) {
        self.draw_calls += 1;
        self.indices_drawn += u64::from(index_count);
    }
}
