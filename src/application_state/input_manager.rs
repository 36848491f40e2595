//! # Input Manager
//!
//! This module handles input processing for the application, including:
//! - Keyboard input state tracking
//! - Mouse button and motion tracking
//! - Per-frame snapshots with press and release edges

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

/// Keys the engine reacts to.
pub const KEY_CODES: [KeyCode; 9] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::Tab,
    KeyCode::KeyR,
    KeyCode::KeyP,
    KeyCode::Escape,
];

const MOUSE_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Manages the state of all input devices and processes input events.
///
/// This struct maintains the current state of keyboard and mouse inputs
/// and provides methods to process input events from the windowing system.
#[derive(Debug)]
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key and button released.
    pub fn new() -> Self {
        let keyboard_inputs_old: HashMap<KeyCode, bool> =
            KEY_CODES.iter().map(|&key| (key, false)).collect();
        let keyboard_inputs_new = keyboard_inputs_old.clone();

        let mouse_button_inputs_old: HashMap<MouseButton, bool> =
            MOUSE_BUTTONS.iter().map(|&button| (button, false)).collect();
        let mouse_button_inputs_new = mouse_button_inputs_old.clone();

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            mouse_inputs: MouseInput {
                mouse_button_inputs_old,
                mouse_button_inputs_new,
                mouse_button_presses: HashSet::new(),
                mouse_delta: None,
            },
        }
    }

    /// Updates the old state with the current state to prepare for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::MouseInput { button, state, .. } => {
                self.set_mouse_button(*button, *state == ElementState::Pressed)
            }
            _ => {}
        }
    }

    /// Records the current down state of a key. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
        }
    }

    /// Records the current down state of a mouse button. Untracked buttons are ignored.
    ///
    /// A press is latched until the next snapshot, so a click released within the same frame
    /// still reads as [`RawInputState::Pressed`].
    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(&button) {
            if pressed && !*button_state {
                self.mouse_inputs.mouse_button_presses.insert(button);
            }
            *button_state = pressed;
        }
    }

    /// Adds raw mouse motion to the delta of the current frame.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_inputs.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_inputs.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Creates a processed input state from the current raw boolean states.
    ///
    /// This translates the raw boolean states into RawInputState enum values
    /// that represent the state transitions (pressed, held, released, not pressed).
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                let state = if self.mouse_inputs.mouse_button_presses.contains(button) {
                    RawInputState::Pressed
                } else {
                    RawInputState::from_raw_states(old_state, new_state)
                };
                (*button, state)
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
        }
    }

    /// Returns the processed input state and resets internal state for the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Rolls the current states into the previous ones and clears mouse motion.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.mouse_inputs.mouse_button_presses.clear();
        self.mouse_inputs.mouse_delta = None;
    }

    /// Releases every key and button, for example when the window loses focus.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|state| *state = false);
        self.mouse_inputs
            .mouse_button_inputs_new
            .values_mut()
            .for_each(|state| *state = false);
        self.mouse_inputs.mouse_button_presses.clear();
        self.mouse_inputs.mouse_delta = None;
    }
}
