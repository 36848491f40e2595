//! Per-voxel-face mesh generation for chunks.
//!
//! Every non-empty block contributes one quad per visible face. A face is visible when the
//! neighbouring cell, looked up through the [`World`] so chunk seams resolve correctly, is
//! outside the world, empty, or transparent while the block itself is opaque. Quads are
//! bucketed by the block's [`ShaderPass`].

use cgmath::Vector3;

use crate::engine_state::{
    rendering::Vertex,
    voxels::{
        block::{block_side::BlockSide, block_type::BlockId, BlockData, ShaderPass},
        chunk::{Chunk, CHUNK_SIZE},
        world::World,
    },
};

use super::face::{generate_face_indices, Face};

/// Relative height of a water block whose surface is exposed.
pub const WATER_SURFACE_HEIGHT: f32 = 0.8;

/// Decides whether the face of `current` towards `neighbour` must be emitted.
///
/// `neighbour` is `None` when the adjacent cell lies outside the world.
pub fn should_render_face(current: BlockId, neighbour: Option<BlockId>) -> bool {
    let Some(neighbour) = neighbour else {
        return true;
    };

    if neighbour.is_empty() {
        return true;
    }

    BlockData::get(current).pass == ShaderPass::Opaque
        && BlockData::get(neighbour).pass == ShaderPass::Transparent
}

/// Vertex and index data for one render pass of a chunk.
#[derive(Debug, Default, Clone)]
pub struct PassMesh {
    /// The vertex data for this pass
    pub vertices: Vec<Vertex>,
    /// The index data for this pass
    pub indices: Vec<u32>,
}

impl PassMesh {
    /// Appends the quad of `face`.
    pub fn push_face(&mut self, face: &Face) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&face.vertices());
        self.indices.extend_from_slice(&generate_face_indices(base));
    }

    /// Number of quads in the pass.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// Whether the pass has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// CPU-side geometry of a chunk, one [`PassMesh`] per render pass.
#[derive(Debug, Default, Clone)]
pub struct ChunkMesh {
    passes: [PassMesh; ShaderPass::COUNT],
}

impl ChunkMesh {
    /// Builds the mesh of `chunk` from its current block data.
    ///
    /// Cells are visited in z, y, x order, so the output is deterministic.
    pub fn build(chunk: &Chunk, world: &World) -> Self {
        let mut mesh = ChunkMesh::default();
        let chunk_origin = chunk.block_offset();

        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let Some(block) = chunk.get_local_block(x, y, z) else {
                        continue;
                    };
                    if block.is_empty() {
                        continue;
                    }

                    let global = chunk_origin + Vector3::new(x, y, z);
                    let local = Vector3::new(x as f32, y as f32, z as f32);
                    mesh.push_block(world, block, global, local);
                }
            }
        }

        mesh
    }

    fn push_block(
        &mut self,
        world: &World,
        block: BlockId,
        global: Vector3<i32>,
        local: Vector3<f32>,
    ) {
        let data = BlockData::get(block);
        let height = if block == BlockId::Water
            && world
                .get_block(global.x, global.y + 1, global.z)
                .is_none_or(BlockId::is_empty)
        {
            WATER_SURFACE_HEIGHT
        } else {
            1.0
        };

        for side in BlockSide::all() {
            let neighbour_position = global + side.neighbour_offset();
            let neighbour = world.get_block(
                neighbour_position.x,
                neighbour_position.y,
                neighbour_position.z,
            );
            if !should_render_face(block, neighbour) {
                continue;
            }

            let basis = side.basis(height);
            let face = Face::new(
                local + basis.origin,
                basis.up,
                basis.right,
                data.texture_for(side),
            );
            self.passes[data.pass.index()].push_face(&face);
        }
    }

    /// Geometry of a single pass.
    pub fn pass(&self, pass: ShaderPass) -> &PassMesh {
        &self.passes[pass.index()]
    }

    /// Total number of quads across passes.
    pub fn face_count(&self) -> usize {
        self.passes.iter().map(PassMesh::face_count).sum()
    }

    /// Whether no pass has geometry.
    pub fn is_empty(&self) -> bool {
        self.passes.iter().all(PassMesh::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(blocks: &[((i32, i32, i32), BlockId)]) -> World {
        let mut world = World::new(2);
        for ((x, y, z), id) in blocks {
            assert!(world.set_block(*x, *y, *z, *id));
        }
        world
    }

    fn chunk_mesh_at(world: &World, x: i32, y: i32, z: i32) -> ChunkMesh {
        let chunk = world
            .get_chunk_containing(x, y, z)
            .expect("coordinate inside the world");
        ChunkMesh::build(chunk, world)
    }

    #[test]
    fn culling_rule_matches_block_passes() {
        assert!(should_render_face(BlockId::Stone, None));
        assert!(should_render_face(BlockId::Stone, Some(BlockId::Empty)));
        assert!(should_render_face(BlockId::Stone, Some(BlockId::Water)));
        assert!(!should_render_face(BlockId::Stone, Some(BlockId::Dirt)));
        assert!(!should_render_face(BlockId::Water, Some(BlockId::Water)));
        assert!(!should_render_face(BlockId::Water, Some(BlockId::Stone)));
        assert!(should_render_face(BlockId::Water, Some(BlockId::Empty)));
    }

    #[test]
    fn isolated_block_emits_six_faces() {
        let world = world_with(&[((4, 4, 4), BlockId::Stone)]);
        let mesh = chunk_mesh_at(&world, 4, 4, 4);

        assert_eq!(mesh.pass(ShaderPass::Opaque).face_count(), 6);
        assert_eq!(mesh.pass(ShaderPass::Opaque).vertices.len(), 24);
        assert_eq!(mesh.pass(ShaderPass::Opaque).indices.len(), 36);
        assert!(mesh.pass(ShaderPass::Transparent).is_empty());
    }

    #[test]
    fn adjacent_blocks_share_no_faces() {
        let world = world_with(&[((4, 4, 4), BlockId::Stone), ((5, 4, 4), BlockId::Dirt)]);
        let mesh = chunk_mesh_at(&world, 4, 4, 4);

        assert_eq!(mesh.face_count(), 10, "the touching faces must be culled");
    }

    fn solid_chunk() -> World {
        let mut world = World::new(1);
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    world.set_block(x, y, z, BlockId::Stone);
                }
            }
        }
        world
    }

    #[test]
    fn buried_blocks_emit_no_faces() {
        let world = solid_chunk();
        let mesh = chunk_mesh_at(&world, 0, 0, 0);

        // Only the six outer walls of the chunk remain.
        assert_eq!(mesh.face_count(), 6 * (CHUNK_SIZE * CHUNK_SIZE) as usize);
    }

    #[test]
    fn one_empty_neighbour_exposes_exactly_one_face() {
        let mut world = solid_chunk();
        world.set_block(8, 8, 8, BlockId::Empty);
        let mesh = chunk_mesh_at(&world, 0, 0, 0);

        let walls = 6 * (CHUNK_SIZE * CHUNK_SIZE) as usize;
        assert_eq!(mesh.face_count(), walls + 6);
        let facing_hole = mesh
            .pass(ShaderPass::Opaque)
            .vertices
            .iter()
            .filter(|vertex| vertex.normal == [0.0, -1.0, 0.0] && vertex.position[1] == 9.0)
            .count();
        assert_eq!(facing_hole, 4, "the block above shows only its bottom face");
    }

    #[test]
    fn opaque_faces_next_to_water_are_emitted() {
        let mut world = solid_chunk();
        world.set_block(8, 8, 8, BlockId::Water);
        let mesh = chunk_mesh_at(&world, 0, 0, 0);

        let walls = 6 * (CHUNK_SIZE * CHUNK_SIZE) as usize;
        assert_eq!(mesh.pass(ShaderPass::Opaque).face_count(), walls + 6);
        assert!(
            mesh.pass(ShaderPass::Transparent).is_empty(),
            "water enclosed by stone has no visible faces"
        );
    }

    #[test]
    fn faces_across_a_chunk_seam_are_culled() {
        let world = world_with(&[
            ((CHUNK_SIZE - 1, 4, 4), BlockId::Stone),
            ((CHUNK_SIZE, 4, 4), BlockId::Stone),
        ]);

        let left = chunk_mesh_at(&world, CHUNK_SIZE - 1, 4, 4);
        let right = chunk_mesh_at(&world, CHUNK_SIZE, 4, 4);
        assert_eq!(left.face_count(), 5);
        assert_eq!(right.face_count(), 5);
    }

    #[test]
    fn faces_on_the_world_border_are_emitted() {
        let world = world_with(&[((0, 0, 0), BlockId::Stone)]);
        let mesh = chunk_mesh_at(&world, 0, 0, 0);

        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn exposed_water_surface_is_lowered() {
        let world = world_with(&[((2, 2, 2), BlockId::Water)]);
        let mesh = chunk_mesh_at(&world, 2, 2, 2);
        let water = mesh.pass(ShaderPass::Transparent);

        assert_eq!(water.face_count(), 6);
        let top = water
            .vertices
            .iter()
            .map(|vertex| vertex.position[1])
            .fold(f32::MIN, f32::max);
        assert!((top - (2.0 + WATER_SURFACE_HEIGHT)).abs() < 1e-6);
    }

    #[test]
    fn submerged_water_keeps_full_height() {
        let world = world_with(&[((2, 2, 2), BlockId::Water), ((2, 3, 2), BlockId::Water)]);
        let mesh = chunk_mesh_at(&world, 2, 2, 2);
        let water = mesh.pass(ShaderPass::Transparent);

        let lower_block_top = water
            .vertices
            .iter()
            .filter(|vertex| vertex.position[1] <= 3.0 + 1e-6)
            .map(|vertex| vertex.position[1])
            .fold(f32::MIN, f32::max);
        assert!((lower_block_top - 3.0).abs() < 1e-6);
    }
}
