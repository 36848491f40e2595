//! Mesh generation for voxel rendering.
//!
//! This module converts chunk block data into GPU-ready vertex and index arrays, one pair per
//! [`ShaderPass`](crate::engine_state::voxels::block::ShaderPass).
//!
//! # Architecture
//! - `face`: quad geometry and atlas texture coordinates of a single block face
//! - `mesh`: face culling and per-pass mesh assembly for a whole chunk

pub mod face;
pub mod mesh;

pub use mesh::{should_render_face, ChunkMesh, PassMesh, WATER_SURFACE_HEIGHT};
