use cgmath::{InnerSpace, Vector3};

use crate::engine_state::rendering::Vertex;

/// Number of tiles along each side of the square texture atlas.
pub const ATLAS_TILES_PER_ROW: u32 = 16;

/// A single quad of a voxel face, in chunk-local coordinates.
///
/// The quad spans `origin`, `origin + right`, `origin + up` and `origin + up + right`;
/// its normal is `up × right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Bottom-left corner
    pub origin: Vector3<f32>,
    /// Edge towards the upper-left corner
    pub up: Vector3<f32>,
    /// Edge towards the bottom-right corner
    pub right: Vector3<f32>,
    /// Atlas tile sampled across the quad
    pub tex_id: u32,
}

impl Face {
    /// Creates a new face.
    pub fn new(origin: Vector3<f32>, up: Vector3<f32>, right: Vector3<f32>, tex_id: u32) -> Self {
        Self {
            origin,
            up,
            right,
            tex_id,
        }
    }

    /// Unit normal of the face.
    pub fn normal(&self) -> Vector3<f32> {
        self.up.cross(self.right).normalize()
    }

    /// Atlas UVs of the bottom-left, bottom-right, upper-left and upper-right corners.
    ///
    /// The tile sits at column `tex_id % 16`, row `tex_id / 16`; texture rows grow
    /// downwards, so the upper corners take the smaller `v`.
    pub fn tex_coords(&self) -> [[f32; 2]; 4] {
        let tiles = ATLAS_TILES_PER_ROW as f32;
        let u = (self.tex_id % ATLAS_TILES_PER_ROW) as f32;
        let v = (self.tex_id / ATLAS_TILES_PER_ROW) as f32;

        [
            [u / tiles, (v + 1.0) / tiles],
            [(u + 1.0) / tiles, (v + 1.0) / tiles],
            [u / tiles, v / tiles],
            [(u + 1.0) / tiles, v / tiles],
        ]
    }

    /// The four vertices in bottom-left, bottom-right, upper-left, upper-right order.
    pub fn vertices(&self) -> [Vertex; 4] {
        let normal = self.normal();
        let [bl, br, ul, ur] = self.tex_coords();

        [
            Vertex::new(self.origin, normal, bl),
            Vertex::new(self.origin + self.right, normal, br),
            Vertex::new(self.origin + self.up, normal, ul),
            Vertex::new(self.origin + self.up + self.right, normal, ur),
        ]
    }
}

/// Index pattern of a quad pushed as [`Face::vertices`], relative to its first vertex.
///
/// Two triangles `(bottom-left, upper-left, upper-right)` and
/// `(bottom-left, upper-right, bottom-right)`; back-face culling depends on this order.
pub fn generate_face_indices(base: u32) -> [u32; 6] {
    const BL: u32 = 0;
    const BR: u32 = 1;
    const UL: u32 = 2;
    const UR: u32 = 3;

    [
        base + BL,
        base + UL,
        base + UR,
        base + BL,
        base + UR,
        base + BR,
    ]
}
