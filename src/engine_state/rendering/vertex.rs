//! Vertex data structures and layouts for chunk rendering.

use cgmath::Vector3;

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] in chunk-local block units (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] in atlas space (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position relative to the chunk origin
    pub position: [f32; 3],
    /// Unit face normal
    pub normal: [f32; 3],
    /// UV coordinates into the texture atlas (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2
    ];

    /// Creates a new vertex.
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>, tex_coords: [f32; 2]) -> Self {
        Vertex {
            position: position.into(),
            normal: normal.into(),
            tex_coords,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    /// - `location = 2`: tex_coords (vec2<f32>)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
