//! # Engine Errors
//!
//! Every fallible operation in the engine reports an [`EngineError`]. Out-of-range voxel
//! coordinates are not errors (they are answered with `None`), so the variants here are all
//! resource or environment failures that the application shell decides how to handle.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures surfaced by the engine and its collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No graphics adapter satisfied the request.
    #[error("graphics adapter not found: {0}")]
    AdapterNotFound(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to create a device.
    #[error("failed to request graphics device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// The window could not be turned into a render surface.
    #[error("failed to create render surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// The next swap-chain image could not be acquired.
    #[error("failed to acquire surface texture: {0}")]
    SurfaceAcquire(#[from] wgpu::SurfaceError),

    /// The surface reports no usable format for this adapter.
    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,

    /// A buffer upload exceeded what the device accepts.
    #[error("buffer '{label}' needs {requested} bytes but the device limit is {limit}")]
    BufferTooLarge {
        /// Debug label of the buffer
        label: String,
        /// Requested size in bytes
        requested: u64,
        /// Device `max_buffer_size`
        limit: u64,
    },

    /// A named buffer was used before it was created.
    #[error("buffer '{0}' has not been created")]
    MissingBuffer(&'static str),

    /// The texture atlas could not be decoded.
    #[error("failed to decode texture: {0}")]
    Image(#[from] image::ImageError),

    /// The texture atlas has unusable dimensions.
    #[error("texture atlas must be square with a side divisible by 16, got {width}x{height}")]
    AtlasDimensions {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },

    /// The configured world cannot be allocated or addressed.
    #[error("world_size must be between 1 and {max}, got {world_size}")]
    WorldSize {
        /// Requested chunks per axis
        world_size: usize,
        /// Largest accepted value
        max: usize,
    },

    /// Reading a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`crate::config::EngineConfig`].
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The windowing event loop failed.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The operating system refused to create the window.
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}
