//! # Game State
//!
//! Everything the engine simulates, without any GPU resources: the world, the player, the
//! noise source and the interaction mode. Input arrives as a
//! [`ProcessedInputState`] snapshot and leaves as a [`PlayerInput`] and an [`InputOutcome`]
//! for the parts the shell has to act on.

use cgmath::Point3;
use log::info;
use winit::{event::MouseButton, keyboard::KeyCode};

use super::{
    player::{Player, PlayerInput},
    voxels::{terrain::PerlinNoise, world::World},
};
use crate::{
    application_state::input_state::ProcessedInputState,
    config::{EngineConfig, GenerationConfig},
};

/// What keyboard and mouse input is routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionMode {
    /// Input drives the player; the cursor is grabbed.
    #[default]
    Play,
    /// The player is frozen, the cursor is free and debug keys are live.
    Debug,
}

impl InteractionMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            InteractionMode::Play => InteractionMode::Debug,
            InteractionMode::Debug => InteractionMode::Play,
        }
    }
}

/// Requests raised by one input snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// Set when the mode switched this frame
    pub mode_changed: Option<InteractionMode>,
    /// Reload the configuration file and regenerate
    pub reload_config: bool,
    /// Log generation parameters and buffer statistics
    pub print_stats: bool,
}

/// World, player and mode.
pub struct GameState {
    config: EngineConfig,
    world: World,
    player: Player,
    noise: PerlinNoise,
    mode: InteractionMode,
    pending_input: PlayerInput,
}

impl GameState {
    /// Generates the world described by `config` and spawns the player on it.
    pub fn new(config: EngineConfig) -> Self {
        let noise = PerlinNoise::new(config.generation.seed);
        let mut world = World::new(config.world.world_size);
        world.generate(&config.generation, &noise);
        let player = Player::spawn(&world, config.player.clone());

        Self {
            config,
            world,
            player,
            noise,
            mode: InteractionMode::Play,
            pending_input: PlayerInput::default(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The block world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the block world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Current interaction mode.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Translates an input snapshot into player input and mode requests.
    ///
    /// Tab toggles the mode. In [`InteractionMode::Debug`] `R` requests a config reload and
    /// `P` requests statistics; neither does anything while playing.
    pub fn intake_input(&mut self, input: &ProcessedInputState) -> InputOutcome {
        let mut outcome = InputOutcome::default();

        if input.get_key_state(KeyCode::Tab).is_just_pressed() {
            self.mode = self.mode.toggled();
            outcome.mode_changed = Some(self.mode);
            info!("Switched to {:?} mode", self.mode);
        }

        match self.mode {
            InteractionMode::Play => {
                let (dx, dy) = input.get_mouse_delta().unwrap_or((0.0, 0.0));
                self.pending_input = PlayerInput {
                    forward: input.get_key_state(KeyCode::KeyW).is_active(),
                    backward: input.get_key_state(KeyCode::KeyS).is_active(),
                    left: input.get_key_state(KeyCode::KeyA).is_active(),
                    right: input.get_key_state(KeyCode::KeyD).is_active(),
                    jump: input.get_key_state(KeyCode::Space).is_active(),
                    primary_action_pressed: input
                        .get_mouse_button_state(MouseButton::Left)
                        .is_just_pressed(),
                    mouse_delta: (dx as f32, dy as f32),
                };
            }
            InteractionMode::Debug => {
                self.pending_input = PlayerInput::default();
                outcome.reload_config = input.get_key_state(KeyCode::KeyR).is_just_pressed();
                outcome.print_stats = input.get_key_state(KeyCode::KeyP).is_just_pressed();
            }
        }

        outcome
    }

    /// Advances the simulation by `dt` seconds. The player is frozen in debug mode.
    ///
    /// # Returns
    /// The cell of a block broken this tick.
    pub fn update(&mut self, dt: f32) -> Option<Point3<i32>> {
        if self.mode == InteractionMode::Debug {
            return None;
        }

        let input = std::mem::take(&mut self.pending_input);
        self.player.update(dt, &input, &mut self.world)
    }

    /// Replaces the terrain parameters and regenerates the world.
    pub fn apply_generation_config(&mut self, generation: GenerationConfig) {
        self.config.generation = generation;
        self.regenerate();
    }

    /// Applies a whole configuration.
    ///
    /// # Returns
    /// The previous world when the world size changed. Its meshes still hold backend
    /// buffers, which the caller must release.
    pub fn apply_config(&mut self, config: EngineConfig) -> Option<World> {
        let resized = config.world.world_size != self.config.world.world_size;
        self.config = config;

        let replaced = resized.then(|| {
            std::mem::replace(&mut self.world, World::new(self.config.world.world_size))
        });
        self.regenerate();
        replaced
    }

    /// Regenerates the terrain from the current parameters and respawns the player.
    ///
    /// Existing meshes are rebuilt lazily on the next draw.
    pub fn regenerate(&mut self) {
        self.noise = PerlinNoise::new(self.config.generation.seed);
        self.world.generate(&self.config.generation, &self.noise);

        let (yaw, pitch) = (self.player.yaw(), self.player.pitch());
        self.player = Player::spawn(&self.world, self.config.player.clone());
        self.player.set_orientation(yaw, pitch);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::application_state::input_state::RawInputState;
    use crate::engine_state::voxels::block::block_type::BlockId;

    /// A 32³ world with a single layer of grass at `y = 0`.
    fn small_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.world.world_size = 2;
        config.generation.stone_height = 0.0;
        config.generation.dirt_height = 0.0;
        config.generation.water_height = 0;
        config
    }

    fn snapshot(keys: &[(KeyCode, RawInputState)]) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys.iter().copied().collect(),
            mouse_button_states: HashMap::new(),
            mouse_delta: None,
        }
    }

    #[test]
    fn tab_toggles_the_mode() {
        let mut game = GameState::new(small_config());

        let outcome = game.intake_input(&snapshot(&[(KeyCode::Tab, RawInputState::Pressed)]));
        assert_eq!(outcome.mode_changed, Some(InteractionMode::Debug));

        let held = game.intake_input(&snapshot(&[(KeyCode::Tab, RawInputState::Held)]));
        assert_eq!(held.mode_changed, None, "holding Tab does not toggle again");
        assert_eq!(game.mode(), InteractionMode::Debug);

        game.intake_input(&snapshot(&[(KeyCode::Tab, RawInputState::Pressed)]));
        assert_eq!(game.mode(), InteractionMode::Play);
    }

    #[test]
    fn debug_keys_only_work_in_debug_mode() {
        let mut game = GameState::new(small_config());
        let keys = [
            (KeyCode::KeyR, RawInputState::Pressed),
            (KeyCode::KeyP, RawInputState::Pressed),
        ];

        let playing = game.intake_input(&snapshot(&keys));
        assert!(!playing.reload_config && !playing.print_stats);

        game.intake_input(&snapshot(&[(KeyCode::Tab, RawInputState::Pressed)]));
        let debugging = game.intake_input(&snapshot(&keys));
        assert!(debugging.reload_config && debugging.print_stats);
    }

    #[test]
    fn debug_mode_freezes_the_player() {
        let mut game = GameState::new(small_config());
        game.intake_input(&snapshot(&[(KeyCode::Tab, RawInputState::Pressed)]));
        let before = game.player().position();

        game.intake_input(&snapshot(&[(KeyCode::KeyW, RawInputState::Held)]));
        for _ in 0..10 {
            game.update(0.05);
        }

        assert_eq!(game.player().position(), before);
    }

    #[test]
    fn walking_moves_the_player_in_play_mode() {
        let mut game = GameState::new(small_config());
        let before = game.player().position();

        game.intake_input(&snapshot(&[(KeyCode::KeyW, RawInputState::Held)]));
        game.update(0.05);

        assert!(game.player().position().z < before.z);
    }

    #[test]
    fn generation_changes_regenerate_the_world() {
        let mut game = GameState::new(small_config());

        assert_eq!(game.world().get_block(5, 0, 5), Some(BlockId::Grass));
        assert_eq!(game.player().position().y, 1.0);

        let mut generation = game.config().generation.clone();
        generation.water_height = 5;
        game.apply_generation_config(generation);

        assert_eq!(game.world().get_block(5, 0, 5), Some(BlockId::Water));
        assert_eq!(game.world().get_block(5, 4, 5), Some(BlockId::Water));
        assert_eq!(game.world().get_block(5, 5, 5), Some(BlockId::Empty));
        assert_eq!(game.world().dirty_chunk_count(), 8);
        assert_eq!(game.player().position().y, 5.0);
    }

    #[test]
    fn resizing_the_world_hands_back_the_old_one() {
        let mut game = GameState::new(small_config());

        let same = game.apply_config(small_config());
        assert!(same.is_none());

        let mut larger = small_config();
        larger.world.world_size = 3;
        let old = game.apply_config(larger);

        assert_eq!(old.map(|world| world.world_size()), Some(2));
        assert_eq!(game.world().world_size(), 3);
    }
}
