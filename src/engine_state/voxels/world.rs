//! # World Module
//!
//! The `World` owns a fixed cube of `world_size`³ chunks and exposes one global block
//! coordinate space over them.
//!
//! ## Coordinates
//!
//! A global coordinate `(gx, gy, gz)` belongs to chunk `g / CHUNK_SIZE` at local cell
//! `g % CHUNK_SIZE` on each axis. Anything negative or at/after
//! `world_size * CHUNK_SIZE` has no storage: reads return `None` and writes are ignored.
//!
//! ## Dirty propagation
//!
//! A block write can change the visibility of faces in the six neighbouring cells, which
//! may live in other chunks. [`World::set_block`] therefore marks the chunk owning the
//! written cell and the chunks owning each of its six neighbours.

use cgmath::Point3;
use log::{debug, info, warn};

use super::{
    block::{block_type::BlockId, ShaderPass},
    chunk::{Chunk, CHUNK_SIZE},
    terrain::{self, NoiseSource},
};
use crate::{
    config::{GenerationConfig, WorldConfig},
    engine_state::{camera_state::frustum::Frustum, rendering::backend::RenderBackend},
    error::Result,
};

/// Offsets of the six axis-adjacent cells.
const NEIGHBOUR_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Counters collected by [`World::draw`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    /// Chunks handed to [`Chunk::draw`]
    pub chunks_visited: usize,
    /// Chunks skipped by the frustum test
    pub chunks_culled: usize,
    /// Indexed draws issued
    pub draw_calls: usize,
}

/// A fixed-size voxel world.
pub struct World {
    world_size: i32,
    chunks: Vec<Chunk>,
}

impl World {
    /// Creates an empty world of `world_size`³ chunks.
    ///
    /// Every chunk is placed at its grid coordinates and starts dirty. Sizes outside
    /// `1..=WorldConfig::MAX_WORLD_SIZE` are clamped into that range.
    pub fn new(world_size: usize) -> Self {
        let clamped = world_size.clamp(1, WorldConfig::MAX_WORLD_SIZE);
        if clamped != world_size {
            warn!("World size {} out of range, using {}", world_size, clamped);
        }

        let mut chunks = Vec::with_capacity(clamped.pow(3));
        let world_size = clamped as i32;

        for cz in 0..world_size {
            for cy in 0..world_size {
                for cx in 0..world_size {
                    let mut chunk = Chunk::new();
                    chunk.set_position(cx, cy, cz);
                    chunks.push(chunk);
                }
            }
        }

        World { world_size, chunks }
    }

    /// Number of chunks along each axis.
    pub fn world_size(&self) -> i32 {
        self.world_size
    }

    /// Number of blocks along each axis.
    pub fn extent(&self) -> i32 {
        self.world_size * CHUNK_SIZE
    }

    /// All chunks in index order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    fn chunk_index(&self, cx: i32, cy: i32, cz: i32) -> Option<usize> {
        let range = 0..self.world_size;
        if !range.contains(&cx) || !range.contains(&cy) || !range.contains(&cz) {
            return None;
        }

        let size = self.world_size as usize;
        Some(cx as usize + cy as usize * size + cz as usize * size * size)
    }

    /// Chunk at chunk-grid coordinates.
    pub fn get_chunk(&self, cx: i32, cy: i32, cz: i32) -> Option<&Chunk> {
        self.chunk_index(cx, cy, cz).map(|index| &self.chunks[index])
    }

    /// Chunk owning the global block coordinate.
    pub fn get_chunk_containing(&self, gx: i32, gy: i32, gz: i32) -> Option<&Chunk> {
        let (chunk, _) = self.locate(gx, gy, gz)?;
        self.get_chunk(chunk.x, chunk.y, chunk.z)
    }

    /// Splits a global coordinate into chunk-grid and local coordinates.
    ///
    /// # Returns
    /// `None` when any axis is negative or beyond [`World::extent`].
    pub fn locate(&self, gx: i32, gy: i32, gz: i32) -> Option<(Point3<i32>, Point3<i32>)> {
        let extent = 0..self.extent();
        if !extent.contains(&gx) || !extent.contains(&gy) || !extent.contains(&gz) {
            return None;
        }

        Some((
            Point3::new(gx / CHUNK_SIZE, gy / CHUNK_SIZE, gz / CHUNK_SIZE),
            Point3::new(gx % CHUNK_SIZE, gy % CHUNK_SIZE, gz % CHUNK_SIZE),
        ))
    }

    /// Reads the block at a global coordinate.
    pub fn get_block(&self, gx: i32, gy: i32, gz: i32) -> Option<BlockId> {
        let (chunk, local) = self.locate(gx, gy, gz)?;
        self.get_chunk(chunk.x, chunk.y, chunk.z)?
            .get_local_block(local.x, local.y, local.z)
    }

    /// Reads the block at an integer point.
    pub fn get_block_at(&self, position: Point3<i32>) -> Option<BlockId> {
        self.get_block(position.x, position.y, position.z)
    }

    fn block_slot_mut(&mut self, gx: i32, gy: i32, gz: i32) -> Option<&mut BlockId> {
        let (chunk, local) = self.locate(gx, gy, gz)?;
        let index = self.chunk_index(chunk.x, chunk.y, chunk.z)?;
        self.chunks[index].get_local_block_mut(local.x, local.y, local.z)
    }

    /// Writes a block and marks every chunk whose mesh may change as dirty.
    ///
    /// # Returns
    /// `false` without side effects when the coordinate lies outside the world.
    pub fn set_block(&mut self, gx: i32, gy: i32, gz: i32, id: BlockId) -> bool {
        let Some(slot) = self.block_slot_mut(gx, gy, gz) else {
            return false;
        };
        *slot = id;

        self.mark_block_dirty(gx, gy, gz);
        true
    }

    /// Writes a block without dirtying anything. Used by bulk generation.
    pub(crate) fn write_block(&mut self, gx: i32, gy: i32, gz: i32, id: BlockId) -> bool {
        match self.block_slot_mut(gx, gy, gz) {
            Some(slot) => {
                *slot = id;
                true
            }
            None => false,
        }
    }

    fn mark_block_dirty(&self, gx: i32, gy: i32, gz: i32) {
        if let Some(chunk) = self.get_chunk_containing(gx, gy, gz) {
            chunk.mark_dirty();
        }

        for (dx, dy, dz) in NEIGHBOUR_OFFSETS {
            if let Some(chunk) = self.get_chunk_containing(gx + dx, gy + dy, gz + dz) {
                chunk.mark_dirty();
            }
        }
    }

    /// Marks every chunk dirty.
    pub fn mark_all_dirty(&self) {
        self.chunks.iter().for_each(Chunk::mark_dirty);
    }

    /// Number of chunks waiting for a rebuild.
    pub fn dirty_chunk_count(&self) -> usize {
        self.chunks.iter().filter(|chunk| chunk.is_dirty()).count()
    }

    /// Height of the topmost non-empty block of a column.
    pub fn surface_height(&self, gx: i32, gz: i32) -> Option<i32> {
        (0..self.extent())
            .rev()
            .find(|&gy| self.get_block(gx, gy, gz).is_some_and(|id| !id.is_empty()))
    }

    /// Fills the world with procedurally generated terrain.
    ///
    /// Identical parameters and noise produce identical blocks. Every chunk is left dirty.
    pub fn generate<N: NoiseSource + ?Sized>(&mut self, config: &GenerationConfig, noise: &N) {
        self.chunks
            .iter_mut()
            .for_each(|chunk| chunk.fill(BlockId::Empty));

        terrain::fill_terrain(self, config, noise);

        self.mark_all_dirty();
        info!(
            "Generated {}x{}x{} block world (seed {})",
            self.extent(),
            self.extent(),
            self.extent(),
            config.seed
        );
    }

    /// Rebuilds every dirty chunk immediately.
    ///
    /// # Returns
    /// The number of chunks rebuilt.
    pub fn rebuild_dirty<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> Result<usize> {
        let mut rebuilt = 0;
        for chunk in self.chunks.iter().filter(|chunk| chunk.is_dirty()) {
            chunk.rebuild(self, backend)?;
            rebuilt += 1;
        }
        Ok(rebuilt)
    }

    /// Returns every chunk mesh buffer to the backend.
    pub fn release_meshes<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        for chunk in &self.chunks {
            chunk.release_meshes(backend);
        }
    }

    /// Draws one pass of every chunk in index order.
    ///
    /// Chunks whose bounds fall outside `frustum` are skipped (and stay dirty if they were).
    /// Without a frustum the number of draws equals the number of chunks with geometry in
    /// `pass`.
    pub fn draw<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        pass: ShaderPass,
        frustum: Option<&Frustum>,
    ) -> Result<DrawStats> {
        let mut stats = DrawStats::default();

        for chunk in &self.chunks {
            if let Some(frustum) = frustum {
                if !frustum.intersects_aabb(chunk.bounds()) {
                    stats.chunks_culled += 1;
                    continue;
                }
            }

            backend.set_model_transform(chunk.transform());
            stats.chunks_visited += 1;
            if chunk.draw(self, backend, pass)? {
                stats.draw_calls += 1;
            }
        }

        debug!("{:?} pass: {:?}", pass, stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::backend::HeadlessBackend;

    #[test]
    fn set_then_get_returns_the_written_block() {
        let mut world = World::new(2);
        let extent = world.extent();

        for &(x, y, z) in &[(0, 0, 0), (extent - 1, extent - 1, extent - 1), (15, 16, 17)] {
            assert!(world.set_block(x, y, z, BlockId::Log));
            assert_eq!(world.get_block(x, y, z), Some(BlockId::Log));
        }
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let mut world = World::new(2);
        let extent = world.extent();

        for &(x, y, z) in &[
            (-1, 0, 0),
            (0, -1, 0),
            (0, 0, -1),
            (extent, 0, 0),
            (0, extent, 0),
            (0, 0, extent),
            (-CHUNK_SIZE, 3, 3),
        ] {
            assert_eq!(world.get_block(x, y, z), None, "({x}, {y}, {z}) should be outside");
            assert!(!world.set_block(x, y, z, BlockId::Stone));
            assert!(world.locate(x, y, z).is_none());
        }
        assert!(world.chunks().iter().all(|chunk| {
            (0..CHUNK_SIZE).all(|i| chunk.get_local_block(i, i, i) == Some(BlockId::Empty))
        }));
    }

    #[test]
    fn coordinate_mapping_round_trips() {
        let world = World::new(2);
        let extent = world.extent();

        for g in 0..extent {
            let (chunk, local) = world.locate(g, extent - 1 - g, g).unwrap();
            assert_eq!(chunk.x * CHUNK_SIZE + local.x, g);
            assert_eq!(chunk.y * CHUNK_SIZE + local.y, extent - 1 - g);
            assert_eq!(chunk.z * CHUNK_SIZE + local.z, g);
            assert!((0..CHUNK_SIZE).contains(&local.x));
        }
    }

    fn clean_world(world_size: usize) -> World {
        let world = World::new(world_size);
        let mut backend = HeadlessBackend::new();
        world.rebuild_dirty(&mut backend).unwrap();
        assert_eq!(world.dirty_chunk_count(), 0);
        world
    }

    #[test]
    fn boundary_write_dirties_the_neighbouring_chunk() {
        let mut world = clean_world(3);

        world.set_block(CHUNK_SIZE, 20, 20, BlockId::Stone);

        assert!(world.get_chunk(1, 1, 1).unwrap().is_dirty());
        assert!(world.get_chunk(0, 1, 1).unwrap().is_dirty());
        assert_eq!(world.dirty_chunk_count(), 2);
    }

    #[test]
    fn corner_write_dirties_every_face_neighbour() {
        let mut world = clean_world(3);

        world.set_block(CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE, BlockId::Stone);

        assert!(world.get_chunk(1, 1, 1).unwrap().is_dirty());
        assert!(world.get_chunk(0, 1, 1).unwrap().is_dirty());
        assert!(world.get_chunk(1, 0, 1).unwrap().is_dirty());
        assert!(world.get_chunk(1, 1, 0).unwrap().is_dirty());
        assert_eq!(world.dirty_chunk_count(), 4);
    }

    #[test]
    fn interior_write_dirties_only_its_chunk() {
        let mut world = clean_world(3);

        world.set_block(20, 20, 20, BlockId::Stone);

        assert!(world.get_chunk(1, 1, 1).unwrap().is_dirty());
        assert_eq!(world.dirty_chunk_count(), 1);
    }

    #[test]
    fn draw_issues_one_call_per_non_empty_pass_buffer() {
        let mut world = World::new(2);
        world.set_block(1, 1, 1, BlockId::Stone);
        world.set_block(20, 1, 1, BlockId::Stone);
        world.set_block(20, 20, 1, BlockId::Water);
        let mut backend = HeadlessBackend::new();

        let opaque = world.draw(&mut backend, ShaderPass::Opaque, None).unwrap();
        let transparent = world
            .draw(&mut backend, ShaderPass::Transparent, None)
            .unwrap();

        assert_eq!(opaque.draw_calls, 2);
        assert_eq!(transparent.draw_calls, 1);
        assert_eq!(opaque.chunks_visited, 8);
        assert_eq!(backend.transforms_set, 16);
        assert_eq!(backend.draw_calls, 3);
    }

    #[test]
    fn chunks_behind_the_camera_are_culled() {
        use cgmath::Deg;

        use crate::engine_state::camera_state::camera::{view_projection, Camera, Projection};

        let mut world = World::new(2);
        for c in [1, 20] {
            world.set_block(c, 1, c, BlockId::Stone);
        }
        let projection = Projection::new(800, 600, Deg(60.0), 0.1, 500.0);
        let mut backend = HeadlessBackend::new();

        let facing = Camera::from_yaw_pitch(Point3::new(16.0, 16.0, 40.0), Deg(0.0), Deg(0.0));
        let frustum = Frustum::from_view_projection(&view_projection(&facing, &projection));
        let seen = world
            .draw(&mut backend, ShaderPass::Opaque, Some(&frustum))
            .unwrap();
        assert_eq!(seen.chunks_culled, 0);
        assert_eq!(seen.draw_calls, 2);

        world.set_block(2, 1, 2, BlockId::Stone);
        let away = Camera::from_yaw_pitch(Point3::new(16.0, 16.0, 40.0), Deg(180.0), Deg(0.0));
        let frustum = Frustum::from_view_projection(&view_projection(&away, &projection));
        let unseen = world
            .draw(&mut backend, ShaderPass::Opaque, Some(&frustum))
            .unwrap();
        assert_eq!(unseen.chunks_culled, 8);
        assert_eq!(unseen.draw_calls, 0);
        assert!(
            world.get_chunk(0, 0, 0).unwrap().is_dirty(),
            "culled chunks are not rebuilt"
        );
    }

    #[test]
    fn zero_size_is_clamped_to_one_chunk() {
        let world = World::new(0);

        assert_eq!(world.world_size(), 1);
        assert_eq!(world.chunks().len(), 1);
        assert_eq!(world.extent(), CHUNK_SIZE);
    }

    #[test]
    fn surface_height_finds_the_topmost_block() {
        let mut world = World::new(1);
        world.set_block(3, 2, 3, BlockId::Stone);
        world.set_block(3, 7, 3, BlockId::Grass);

        assert_eq!(world.surface_height(3, 3), Some(7));
        assert_eq!(world.surface_height(4, 4), None);
        assert_eq!(world.surface_height(-1, 4), None);
    }
}
