//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling and cursor capture
//! - Application lifecycle events
//! - State transitions between initialization and running states

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::{path::PathBuf, sync::Arc};

use graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics};
use input_manager::InputManager;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    config::EngineConfig,
    engine_state::{game_state::InteractionMode, EngineState},
    error::EngineError,
};

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the current state of the application, including graphics resources,
/// input handling, and window management. It implements `ApplicationHandler` to handle
/// window and device events.
pub struct ApplicationState {
    /// The current graphics state
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// Configuration handed to the engine once graphics are ready
    config: Option<EngineConfig>,

    /// Configuration file re-read on reload
    config_path: PathBuf,

    /// The error that stopped the event loop, if any
    pub exit_error: Option<EngineError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core game engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

impl ApplicationState {
    /// Creates the application state for an event loop that has not started yet.
    pub fn new(
        event_loop_proxy: EventLoopProxy<Graphics>,
        config: EngineConfig,
        config_path: PathBuf,
    ) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(
                event_loop_proxy,
                config.window.clone(),
            )),
            state: None,
            config: Some(config),
            config_path,
            exit_error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        error!("{}", err);
        self.exit_error = Some(err);
        event_loop.exit();
    }

    /// Initializes the application state with the required graphics resources.
    fn initialize_application_state(&mut self, graphics: Graphics) -> Result<(), EngineError> {
        let config = self.config.take().unwrap_or_default();
        let Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
        } = graphics;

        let engine_state = EngineState::new(
            surface,
            surface_config,
            device,
            queue,
            config,
            self.config_path.clone(),
        )?;

        set_cursor_captured(&window, true);

        self.state = Some(InitializedApplicationState {
            engine_state,
            window,
            input_manager: InputManager::new(),
            last_wait_time: web_time::Instant::now(),
        });
        self.graphics = MaybeGraphics::Moved;
        info!("Engine initialized");
        Ok(())
    }
}

/// Grabs and hides the cursor for play, or frees it for debug mode.
fn set_cursor_captured(window: &Window, captured: bool) {
    let result = if captured {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };

    if let Err(err) = result {
        warn!("Could not change cursor grab: {}", err);
    }
    window.set_cursor_visible(!captured);
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested
        | WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
            ..
        } = event
        {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                if !is_focused {
                    state.input_manager.release_all();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.engine_state.render() {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Builds the graphics resources the first time the application is resumed.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            if let Err(err) = builder.build_and_send(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    /// Receives the built graphics resources and starts the engine.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        if let Err(err) = self.initialize_application_state(graphics) {
            self.fail(event_loop, err);
        }
    }

    /// Called before the event loop goes to sleep.
    ///
    /// This method handles frame timing, input processing, and triggers rendering
    /// of the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let now = web_time::Instant::now();
            let wait_dt = now - state.last_wait_time;

            let processed_input = state.input_manager.get_and_reset_processed_input();
            let outcome = state.engine_state.process_input(&processed_input);
            if let Some(mode) = outcome.mode_changed {
                set_cursor_captured(&state.window, mode == InteractionMode::Play);
            }

            state.engine_state.update(wait_dt);
            state.last_wait_time = now;

            state.window.request_redraw();
        }
    }
}
