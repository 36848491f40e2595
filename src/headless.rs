//! # Headless Mode
//!
//! Generates and meshes the configured world through [`HeadlessBackend`] without opening a
//! window or touching a GPU, then reports what a frame would have drawn.

use log::info;
use web_time::Instant;

use crate::{
    config::EngineConfig,
    engine_state::{
        game_state::GameState,
        rendering::backend::HeadlessBackend,
        voxels::{block::ShaderPass, world::DrawStats},
    },
    error::Result,
};

/// Statistics of one headless frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessReport {
    /// Chunks in the world
    pub chunks: usize,
    /// Chunks whose meshes were built
    pub chunks_rebuilt: usize,
    /// Opaque pass counters
    pub opaque: DrawStats,
    /// Transparent pass counters
    pub transparent: DrawStats,
    /// Quads across both passes
    pub faces: u64,
    /// Vertices across both passes
    pub vertices: u64,
    /// Mesh buffers held by the backend
    pub live_buffers: usize,
    /// Bytes held by those buffers
    pub live_bytes: u64,
}

/// Generates the world of `config`, meshes it and draws both passes once.
pub fn run_headless(config: EngineConfig) -> Result<HeadlessReport> {
    config.validate()?;

    let started = Instant::now();
    let game = GameState::new(config);
    let generated = started.elapsed();

    let world = game.world();
    let mut backend = HeadlessBackend::new();
    let chunks_rebuilt = world.rebuild_dirty(&mut backend)?;
    let meshed = started.elapsed() - generated;

    let mut report = HeadlessReport {
        chunks: world.chunks().len(),
        chunks_rebuilt,
        ..HeadlessReport::default()
    };

    for pass in ShaderPass::ALL {
        let stats = world.draw(&mut backend, pass, None)?;
        match pass {
            ShaderPass::Opaque => report.opaque = stats,
            ShaderPass::Transparent => report.transparent = stats,
        }
    }

    report.faces = backend.indices_drawn / 6;
    report.vertices = report.faces * 4;
    report.live_buffers = backend.live_buffers();
    report.live_bytes = backend.live_bytes();

    info!(
        "Generated {} chunks in {:.1?}, meshed {} in {:.1?}",
        report.chunks, generated, report.chunks_rebuilt, meshed
    );
    info!(
        "Opaque pass: {} draws, transparent pass: {} draws",
        report.opaque.draw_calls, report.transparent.draw_calls
    );
    info!(
        "{} faces, {} vertices in {} buffers ({} bytes)",
        report.faces, report.vertices, report.live_buffers, report.live_bytes
    );

    Ok(report)
}
