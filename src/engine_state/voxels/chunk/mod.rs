//! # Chunk Module
//!
//! A `Chunk` is a `CHUNK_SIZE`³ cube of block ids at a fixed place in the world grid.
//! It caches one GPU mesh per render pass and rebuilds them lazily: any block change marks
//! the chunk dirty, and the next [`Chunk::draw`] regenerates the geometry before drawing.
//!
//! ## Ownership
//!
//! Chunks only know their own grid coordinates. Whenever a chunk needs to see past its own
//! borders (face culling across seams) the owning [`World`] is passed in by reference, so a
//! chunk can never outlive, own or mutate its world.
//!
//! ## Storage
//!
//! Blocks live in a flat boxed array indexed `x + y * CHUNK_SIZE + z * CHUNK_SIZE²`.

use std::cell::{Cell, RefCell};

use cgmath::{Matrix4, Point3, Vector3};
use log::debug;

use super::{
    block::{block_type::BlockId, ShaderPass},
    world::World,
};
use crate::{
    engine_state::{
        camera_state::frustum::Aabb,
        rendering::{
            backend::{BufferHandle, RenderBackend},
            meshing::ChunkMesh,
        },
    },
    error::Result,
};

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * CHUNK_SIZE as usize;

/// GPU buffers of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GpuMesh {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
}

/// A fixed-size cube of blocks with its cached meshes.
pub struct Chunk {
    /// Chunk-grid coordinates
    position: Point3<i32>,
    /// Translation from chunk-local to world space
    transform: Matrix4<f32>,
    /// World-space bounds
    bounds: Aabb,
    blocks: Box<[BlockId; CHUNK_VOLUME]>,
    meshes: RefCell<[Option<GpuMesh>; ShaderPass::COUNT]>,
    dirty: Cell<bool>,
    rebuilds: Cell<u32>,
}

impl Chunk {
    /// Creates an empty chunk at grid position (0, 0, 0).
    ///
    /// The chunk starts dirty so its first draw builds a mesh.
    pub fn new() -> Self {
        let mut chunk = Self {
            position: Point3::new(0, 0, 0),
            transform: Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)),
            bounds: Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)),
            blocks: Box::new([BlockId::Empty; CHUNK_VOLUME]),
            meshes: RefCell::new([None; ShaderPass::COUNT]),
            dirty: Cell::new(true),
            rebuilds: Cell::new(0),
        };
        chunk.set_position(0, 0, 0);
        chunk
    }

    /// Places the chunk at chunk-grid coordinates `(cx, cy, cz)`.
    ///
    /// Recomputes the local-to-world translation and the bounding box.
    pub fn set_position(&mut self, cx: i32, cy: i32, cz: i32) {
        self.position = Point3::new(cx, cy, cz);

        let offset = self.block_offset();
        let min = Point3::new(offset.x as f32, offset.y as f32, offset.z as f32);
        let size = CHUNK_SIZE as f32;

        self.transform = Matrix4::from_translation(Vector3::new(min.x, min.y, min.z));
        self.bounds = Aabb::new(min, Point3::new(min.x + size, min.y + size, min.z + size));
    }

    /// Chunk-grid coordinates.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// Global block coordinates of the chunk's (0, 0, 0) cell.
    pub fn block_offset(&self) -> Vector3<i32> {
        Vector3::new(self.position.x, self.position.y, self.position.z) * CHUNK_SIZE
    }

    /// Local-to-world transform.
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// World-space bounding box.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    fn local_index(lx: i32, ly: i32, lz: i32) -> Option<usize> {
        let range = 0..CHUNK_SIZE;
        if !range.contains(&lx) || !range.contains(&ly) || !range.contains(&lz) {
            return None;
        }

        Some(lx as usize + ly as usize * CHUNK_SIZE as usize + lz as usize * CHUNK_PLANE_SIZE)
    }

    /// Reads the block at local coordinates, or `None` outside `[0, CHUNK_SIZE)`.
    pub fn get_local_block(&self, lx: i32, ly: i32, lz: i32) -> Option<BlockId> {
        Self::local_index(lx, ly, lz).map(|index| self.blocks[index])
    }

    /// Mutable slot of the block at local coordinates, or `None` outside the chunk.
    ///
    /// Writing through the slot does not mark the chunk dirty; [`World::set_block`] does that
    /// for the chunk and its neighbours.
    pub fn get_local_block_mut(&mut self, lx: i32, ly: i32, lz: i32) -> Option<&mut BlockId> {
        Self::local_index(lx, ly, lz).map(move |index| &mut self.blocks[index])
    }

    /// Flags the cached meshes as stale.
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// Whether the cached meshes are stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Number of completed mesh rebuilds.
    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds.get()
    }

    /// Index count of the cached mesh of `pass`, 0 when it has no geometry.
    pub fn index_count(&self, pass: ShaderPass) -> u32 {
        self.meshes.borrow()[pass.index()].map_or(0, |mesh| mesh.index_count)
    }

    /// Builds the CPU geometry from the current blocks.
    pub fn build_mesh(&self, world: &World) -> ChunkMesh {
        ChunkMesh::build(self, world)
    }

    /// Regenerates and re-uploads every pass, replacing the previous buffers.
    ///
    /// The dirty flag is only cleared when every upload succeeds.
    pub fn rebuild<B: RenderBackend + ?Sized>(&self, world: &World, backend: &mut B) -> Result<()> {
        let mesh = self.build_mesh(world);
        let mut meshes = self.meshes.borrow_mut();

        for pass in ShaderPass::ALL {
            if let Some(old) = meshes[pass.index()].take() {
                backend.release_buffer(old.vertex_buffer);
                backend.release_buffer(old.index_buffer);
            }

            let pass_mesh = mesh.pass(pass);
            if pass_mesh.is_empty() {
                continue;
            }

            let label = format!(
                "chunk ({}, {}, {}) {:?}",
                self.position.x, self.position.y, self.position.z, pass
            );
            let vertex_buffer = backend.create_vertex_buffer(&label, &pass_mesh.vertices)?;
            let index_buffer = match backend.create_index_buffer(&label, &pass_mesh.indices) {
                Ok(handle) => handle,
                Err(err) => {
                    backend.release_buffer(vertex_buffer);
                    return Err(err);
                }
            };

            meshes[pass.index()] = Some(GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: pass_mesh.indices.len() as u32,
            });
        }

        self.dirty.set(false);
        self.rebuilds.set(self.rebuilds.get() + 1);
        debug!(
            "Rebuilt chunk {:?}: {} faces",
            self.position,
            mesh.face_count()
        );
        Ok(())
    }

    /// Draws one pass of the chunk, rebuilding first if the chunk is dirty.
    ///
    /// # Returns
    /// `true` if a draw was issued, `false` if the pass has no geometry.
    pub fn draw<B: RenderBackend + ?Sized>(
        &self,
        world: &World,
        backend: &mut B,
        pass: ShaderPass,
    ) -> Result<bool> {
        if self.is_dirty() {
            self.rebuild(world, backend)?;
        }

        let Some(mesh) = self.meshes.borrow()[pass.index()] else {
            return Ok(false);
        };

        backend.draw_indexed(mesh.vertex_buffer, mesh.index_buffer, mesh.index_count);
        Ok(true)
    }

    /// Returns every cached buffer to the backend and marks the chunk dirty.
    pub fn release_meshes<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        for mesh in self.meshes.borrow_mut().iter_mut() {
            if let Some(old) = mesh.take() {
                backend.release_buffer(old.vertex_buffer);
                backend.release_buffer(old.index_buffer);
            }
        }
        self.mark_dirty();
    }

    /// Overwrites every block with `id` without touching the dirty flag.
    pub(crate) fn fill(&mut self, id: BlockId) {
        self.blocks.fill(id);
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::backend::HeadlessBackend;

    #[test]
    fn local_access_is_bounds_checked() {
        let mut chunk = Chunk::new();

        assert_eq!(chunk.get_local_block(0, 0, 0), Some(BlockId::Empty));
        assert_eq!(chunk.get_local_block(-1, 0, 0), None);
        assert_eq!(chunk.get_local_block(0, CHUNK_SIZE, 0), None);
        assert!(chunk.get_local_block_mut(0, 0, CHUNK_SIZE).is_none());

        *chunk.get_local_block_mut(3, 4, 5).unwrap() = BlockId::Sand;
        assert_eq!(chunk.get_local_block(3, 4, 5), Some(BlockId::Sand));
    }

    #[test]
    fn set_position_moves_transform_and_bounds() {
        let mut chunk = Chunk::new();
        chunk.set_position(1, 2, 3);

        assert_eq!(chunk.block_offset(), Vector3::new(16, 32, 48));
        assert_eq!(chunk.bounds().min, Point3::new(16.0, 32.0, 48.0));
        assert_eq!(chunk.bounds().max, Point3::new(32.0, 48.0, 64.0));
        assert_eq!(chunk.transform().w.truncate(), Vector3::new(16.0, 32.0, 48.0));
    }

    #[test]
    fn mark_dirty_is_idempotent() {
        let chunk = Chunk::new();
        chunk.mark_dirty();
        chunk.mark_dirty();
        assert!(chunk.is_dirty());
    }

    #[test]
    fn draw_twice_rebuilds_once() {
        let mut world = World::new(1);
        world.set_block(1, 1, 1, BlockId::Stone);
        let mut backend = HeadlessBackend::new();
        let chunk = world.get_chunk(0, 0, 0).unwrap();

        assert!(chunk.draw(&world, &mut backend, ShaderPass::Opaque).unwrap());
        assert!(chunk.draw(&world, &mut backend, ShaderPass::Opaque).unwrap());

        assert_eq!(chunk.rebuild_count(), 1);
        assert_eq!(backend.draw_calls, 2);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn empty_pass_is_a_no_op() {
        let mut world = World::new(1);
        world.set_block(1, 1, 1, BlockId::Stone);
        let mut backend = HeadlessBackend::new();
        let chunk = world.get_chunk(0, 0, 0).unwrap();

        assert!(!chunk
            .draw(&world, &mut backend, ShaderPass::Transparent)
            .unwrap());
        assert_eq!(backend.draw_calls, 0);
        assert_eq!(chunk.index_count(ShaderPass::Opaque), 36);
    }

    #[test]
    fn rebuild_replaces_previous_buffers() {
        let mut world = World::new(1);
        world.set_block(1, 1, 1, BlockId::Stone);
        let mut backend = HeadlessBackend::new();

        world.get_chunk(0, 0, 0).unwrap().rebuild(&world, &mut backend).unwrap();
        assert_eq!(backend.live_buffers(), 2);

        world.set_block(2, 1, 1, BlockId::Water);
        world.get_chunk(0, 0, 0).unwrap().rebuild(&world, &mut backend).unwrap();
        assert_eq!(backend.live_buffers(), 4, "one pair per non-empty pass");
        assert_eq!(backend.buffers_released, 2);
    }

    #[test]
    fn failed_upload_keeps_the_chunk_dirty() {
        let mut world = World::new(1);
        world.set_block(1, 1, 1, BlockId::Stone);
        let mut backend = HeadlessBackend::with_max_buffer_size(16);
        let chunk = world.get_chunk(0, 0, 0).unwrap();

        assert!(chunk.draw(&world, &mut backend, ShaderPass::Opaque).is_err());
        assert!(chunk.is_dirty());
        assert_eq!(chunk.rebuild_count(), 0);
    }
}
