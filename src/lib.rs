#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Minicraft
//!
//! A small voxel world built with Rust and WGPU: a fixed grid of chunks filled with
//! noise-generated terrain, meshed face by face, and explored by a first-person player who
//! walks, swims, jumps and breaks blocks.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, input and application lifecycle
//! * `engine_state` - World, player, camera and rendering
//! * `config` - JSON configuration
//! * `headless` - World generation and meshing without a GPU
//!
//! ## Architecture
//!
//! The engine follows a modular architecture with clear separation between:
//! * Platform abstraction (`winit` windowing and input)
//! * Rendering system (based on WGPU, behind the `RenderBackend` trait)
//! * Voxel data management and meshing
//! * Player simulation
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = minicraft::run() {
//!         log::error!("{err}");
//!     }
//! }
//! ```

use application_state::ApplicationState;
use log::info;
use winit::event_loop::EventLoop;

pub mod application_state;
pub mod config;
pub mod engine_state;
pub mod error;
pub mod headless;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use headless::{run_headless, HeadlessReport};

/// Initializes logging to stdout. This crate logs at `info` unless `RUST_LOG` says otherwise.
///
/// Calling it more than once keeps the first logger.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .filter_module("minicraft", log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .try_init();
    info!("Logger initialized");
}

/// Loads the configuration, opens the window and runs until it is closed.
pub fn run() -> Result<()> {
    init_logger();

    let config_path = EngineConfig::default_path();
    let config = EngineConfig::load(&config_path)?;

    let event_loop = EventLoop::with_user_event().build()?;
    let mut state = ApplicationState::new(event_loop.create_proxy(), config, config_path);

    event_loop.run_app(&mut state)?;

    match state.exit_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
