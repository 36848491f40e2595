//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The windowed engine: simulation plus renderer
//! * `game_state` - World, player and interaction mode, free of GPU resources
//! * `buffer_state` - Manages GPU buffers for rendering
//! * `camera_state` - Camera, projection and view frustum
//! * `player` - First-person movement, collisions and block breaking
//! * `rendering` - Contains rendering systems and pipelines
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Architecture
//!
//! `EngineState` owns one [`game_state::GameState`] and one [`rendering::Renderer`] and passes
//! references between them explicitly. Each frame the shell feeds it an input snapshot,
//! advances it by the elapsed time and asks it to render.

use std::path::PathBuf;

use log::{error, info};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::{
    application_state::input_state::ProcessedInputState,
    config::{EngineConfig, GenerationConfig},
    error::Result,
};

pub mod buffer_state;
pub mod camera_state;
pub mod game_state;
pub mod player;
pub mod rendering;
pub mod voxels;

use game_state::{GameState, InputOutcome};
use rendering::{FrameStats, Renderer};

/// The main state container for the windowed engine
///
/// It routes input to the game, reacts to debug requests and renders frames.
pub struct EngineState {
    /// World, player and mode
    pub game: GameState,
    /// GPU resources and the render loop
    pub renderer: Renderer,
    config_path: PathBuf,
}

impl EngineState {
    /// Creates the engine, generating the world and every GPU resource.
    ///
    /// # Arguments
    ///
    /// * `surface` - The rendering surface
    /// * `surface_config` - Configuration the surface was configured with
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    /// * `config` - Engine configuration
    /// * `config_path` - File re-read when a reload is requested
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        config: EngineConfig,
        config_path: PathBuf,
    ) -> Result<Self> {
        let renderer = Renderer::new(surface, surface_config, device, queue, &config.camera)?;
        let game = GameState::new(config);

        Ok(Self {
            game,
            renderer,
            config_path,
        })
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(size);
    }

    /// Feeds one input snapshot to the game and serves debug requests.
    ///
    /// # Returns
    /// The outcome, so the shell can react to mode changes.
    pub fn process_input(&mut self, input: &ProcessedInputState) -> InputOutcome {
        let outcome = self.game.intake_input(input);

        if outcome.reload_config {
            if let Err(err) = self.reload_config() {
                error!("Config reload failed, keeping current settings: {}", err);
            }
        }
        if outcome.print_stats {
            self.log_stats();
        }

        outcome
    }

    /// Advances the simulation.
    pub fn update(&mut self, dt: web_time::Duration) {
        if let Some(cell) = self.game.update(dt.as_secs_f32()) {
            info!("Removed block at ({}, {}, {})", cell.x, cell.y, cell.z);
        }
    }

    /// Renders the current frame
    pub fn render(&mut self) -> Result<FrameStats> {
        self.renderer
            .render(self.game.world(), self.game.player().camera())
    }

    /// Replaces the terrain parameters and regenerates the world.
    pub fn apply_generation_config(&mut self, generation: GenerationConfig) {
        self.game.apply_generation_config(generation);
    }

    /// Re-reads the configuration file and applies it.
    pub fn reload_config(&mut self) -> Result<()> {
        let config = EngineConfig::load(&self.config_path)?;
        self.renderer.apply_camera_config(&config.camera);

        if let Some(old_world) = self.game.apply_config(config) {
            self.renderer.release_world(&old_world);
        }
        info!("Reloaded config from {}", self.config_path.display());
        Ok(())
    }

    /// Logs the generation parameters and buffer statistics.
    pub fn log_stats(&self) {
        info!("Generation parameters: {:?}", self.game.config().generation);

        let buffer_state = &self.renderer.buffer_state;
        info!(
            "Buffers: {} mesh buffers, {} bytes allocated, {} bytes used, {} writes",
            buffer_state.mesh_buffer_count(),
            buffer_state.total_allocated_memory(),
            buffer_state.total_used_memory(),
            buffer_state.total_writes()
        );
        info!(
            "World: {} chunks, {} dirty",
            self.game.world().chunks().len(),
            self.game.world().dirty_chunk_count()
        );
    }
}
