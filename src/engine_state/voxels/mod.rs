//! # Voxel Engine Core
//!
//! This module holds everything that describes and edits the block world, independent of
//! any graphics device.
//!
//! ## Architecture
//!
//! * **Block**: block ids, their immutable registry data and face geometry
//! * **Chunk**: a fixed `CHUNK_SIZE`³ block array with lazily rebuilt per-pass meshes
//! * **World**: the fixed grid of chunks behind one global coordinate space
//! * **Terrain**: deterministic noise-driven generation
//! * **Raycast**: ordered traversal of the cells crossed by a ray
//!
//! ## Data Flow
//!
//! 1. The world is filled by [`world::World::generate`] and every chunk starts dirty
//! 2. Edits go through [`world::World::set_block`], which dirties the affected chunks
//! 3. At draw time each dirty chunk rebuilds its meshes through the render backend
//! 4. The opaque pass of every chunk is drawn before the transparent pass

pub mod block;
pub mod chunk;
pub mod raycast;
pub mod terrain;
pub mod world;
