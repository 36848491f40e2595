//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources required by the application:
//! the window, the WebGPU surface, adapter, device and queue.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Helper that builds them once the event loop is running
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::future::Future;
use std::sync::Arc;

use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    dpi::LogicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::WindowConfig,
    error::{EngineError, Result},
};

/// Contains all graphics-related resources required by the application.
pub struct Graphics {
    /// The application window
    pub window: Arc<Window>,
    /// Surface presenting to `window`, already configured
    pub surface: Surface<'static>,
    /// Configuration `surface` was configured with
    pub surface_config: SurfaceConfiguration,
    /// The GPU device
    pub device: Device,
    /// The GPU command queue
    pub queue: Queue,
}

/// Creates the window and initializes every graphics resource.
///
/// The window and surface are created synchronously; adapter and device requests are
/// returned as a future.
fn create_graphics(
    event_loop: &ActiveEventLoop,
    window_config: &WindowConfig,
) -> Result<impl Future<Output = Result<Graphics>> + 'static> {
    let window_attrs = Window::default_attributes()
        .with_title(window_config.title.clone())
        .with_inner_size(LogicalSize::new(window_config.width, window_config.height));

    let window = Arc::new(event_loop.create_window(window_attrs)?);

    // The instance is a handle to our GPU
    // Backends::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(EngineError::UnsupportedSurface)?;
        let present_mode = surface_caps
            .present_modes
            .first()
            .copied()
            .ok_or(EngineError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(EngineError::UnsupportedSurface)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok(Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
        })
    })
}

/// Helper struct for building the graphics resources once the event loop is active.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
    window_config: WindowConfig,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Waiting for the event loop to resume
    Builder(GraphicsBuilder),

    /// State after graphics resources have been moved to the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the main thread
    /// * `window_config` - Title and initial size of the window
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>, window_config: WindowConfig) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
            window_config,
        }
    }

    /// Builds the graphics resources, blocking on the device request, and sends them
    /// back through the event loop proxy.
    ///
    /// Calling it again after a successful build does nothing.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return Ok(());
        };

        let gfx = pollster::block_on(create_graphics(event_loop, &self.window_config)?)?;
        // Only fails once the event loop is gone, in which case nobody is left to render
        let _ = event_loop_proxy.send_event(gfx);
        Ok(())
    }
}
