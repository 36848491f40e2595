//! # Player
//!
//! The first-person agent: reads a [`PlayerInput`] each tick, moves through the world with
//! gravity, ground and water response and wall collisions, breaks the block it looks at, and
//! carries the [`Camera`] the frame is rendered from.
//!
//! ## Units
//!
//! Positions are in blocks, velocities in blocks per second and `dt` in seconds. The player's
//! position is at its feet; the camera sits [`EYE_HEIGHT`] above.
//!
//! ## Tick order
//!
//! 1. Horizontal velocity from the movement keys
//! 2. Gravity
//! 3. Ground and water response below the feet
//! 4. Wall collisions
//! 5. Integration
//! 6. Block breaking
//! 7. Look and camera update

pub mod physics;

use cgmath::{InnerSpace, Point3, Rad, Vector3};
use log::debug;

use super::{
    camera_state::camera::Camera,
    voxels::{
        block::{block_type::BlockId, BlockData, BlockFlags},
        raycast::raycast,
        world::World,
    },
};
use crate::config::PlayerConfig;

/// Height of the camera above the player's feet.
pub const EYE_HEIGHT: f32 = 1.5;

/// Largest pitch magnitude in radians.
pub const PITCH_LIMIT: f32 = 1.4;

/// Input snapshot for one tick, independent of the windowing system.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Move along the view direction
    pub forward: bool,
    /// Move against the view direction
    pub backward: bool,
    /// Strafe left
    pub left: bool,
    /// Strafe right
    pub right: bool,
    /// Jump, or swim up in water
    pub jump: bool,
    /// The primary action went down this tick
    pub primary_action_pressed: bool,
    /// Mouse movement since the last tick, in device units
    pub mouse_delta: (f32, f32),
}

/// The player and its camera.
#[derive(Debug, Clone)]
pub struct Player {
    position: Point3<f32>,
    velocity: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    camera: Camera,
    config: PlayerConfig,
}

impl Player {
    /// Creates a player standing at `position` and looking down `-Z`.
    pub fn new(position: Point3<f32>, config: PlayerConfig) -> Self {
        let mut player = Self {
            position,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            camera: Camera::new(position),
            config,
        };
        player.sync_camera();
        player
    }

    /// Creates a player on top of the centre column of `world`.
    ///
    /// An empty centre column places the player on the world floor.
    pub fn spawn(world: &World, config: PlayerConfig) -> Self {
        let centre = world.extent() / 2;
        let ground = world.surface_height(centre, centre).map_or(0, |height| height + 1);

        let position = Point3::new(centre as f32 + 0.5, ground as f32, centre as f32 + 0.5);
        debug!("Spawning player at {:?}", position);
        Self::new(position, config)
    }

    /// Position of the player's feet.
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Moves the player without touching its velocity.
    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        self.sync_camera();
    }

    /// Current velocity in blocks per second.
    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    /// Rotation about `+Y` in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Rotation about `+X` in radians, within `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Sets yaw and pitch directly. Pitch is clamped.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.sync_camera();
    }

    /// The camera at eye height.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Tunables in use.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Advances the player by `dt` seconds.
    ///
    /// # Returns
    /// The cell of the block broken this tick, if any.
    pub fn update(&mut self, dt: f32, input: &PlayerInput, world: &mut World) -> Option<Point3<i32>> {
        self.apply_movement(input);
        self.velocity.y -= self.config.gravity * dt;
        self.apply_ground_response(dt, input, world);
        physics::resolve_collisions(world, self.position, &mut self.velocity, dt);

        self.position += self.velocity * dt;

        let broken = if input.primary_action_pressed {
            self.break_targeted_block(world)
        } else {
            None
        };

        self.apply_look(dt, input);
        broken
    }

    fn apply_movement(&mut self, input: &PlayerInput) {
        let forward = flatten(self.camera.forward());
        let right = flatten(self.camera.right());

        let mut direction = Vector3::new(0.0, 0.0, 0.0);
        if input.forward {
            direction += forward;
        }
        if input.backward {
            direction -= forward;
        }
        if input.right {
            direction += right;
        }
        if input.left {
            direction -= right;
        }

        let horizontal = if direction.magnitude2() > f32::EPSILON {
            direction.normalize() * self.config.move_speed
        } else {
            Vector3::new(0.0, 0.0, 0.0)
        };

        self.velocity.x = horizontal.x;
        self.velocity.z = horizontal.z;
    }

    fn apply_ground_response(&mut self, dt: f32, input: &PlayerInput, world: &World) {
        let below = self.position + Vector3::new(0.0, self.velocity.y * dt, 0.0);
        let Some(flags) = physics::flags_at(world, below) else {
            return;
        };

        if !flags.contains(BlockFlags::NO_PHYSICS) {
            self.velocity.y = 0.0;
            self.position.y = self.position.y.round();
            if input.jump {
                self.velocity.y = self.config.jump_speed;
            }
        } else if flags.contains(BlockFlags::GRAVITY_WATER) {
            self.velocity.y *= self.config.water_damping;
            if input.jump {
                self.velocity.y = self.config.jump_speed;
            }
        }
    }

    fn break_targeted_block(&mut self, world: &mut World) -> Option<Point3<i32>> {
        let cells = raycast(
            self.camera.position,
            self.camera.forward(),
            self.config.reach,
        );

        let target = cells.into_iter().find(|cell| {
            world
                .get_block_at(*cell)
                .is_some_and(|id| !BlockData::get(id).flags.contains(BlockFlags::NO_RAYCAST))
        })?;

        world.set_block(target.x, target.y, target.z, BlockId::Empty);
        debug!("Broke block at {:?}", target);
        Some(target)
    }

    fn apply_look(&mut self, dt: f32, input: &PlayerInput) {
        let (dx, dy) = input.mouse_delta;
        let scale = dt * self.config.mouse_sensitivity;

        self.yaw -= dx * scale;
        self.pitch = (self.pitch - dy * scale).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.sync_camera();
    }

    fn sync_camera(&mut self) {
        self.camera.position = self.position + Vector3::new(0.0, EYE_HEIGHT, 0.0);
        self.camera.set_yaw_pitch(Rad(self.yaw), Rad(self.pitch));
    }
}

fn flatten(direction: Vector3<f32>) -> Vector3<f32> {
    let flat = Vector3::new(direction.x, 0.0, direction.z);
    if flat.magnitude2() > f32::EPSILON {
        flat.normalize()
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    const DT: f32 = 0.05;

    /// A 16³ world with a stone floor filling y in `[0, 5)`.
    fn floored_world() -> World {
        let mut world = World::new(1);
        for z in 0..16 {
            for x in 0..16 {
                for y in 0..5 {
                    world.set_block(x, y, z, BlockId::Stone);
                }
            }
        }
        world
    }

    fn idle() -> PlayerInput {
        PlayerInput::default()
    }

    #[test]
    fn falling_player_lands_on_the_floor() {
        let mut world = floored_world();
        let mut player = Player::new(Point3::new(8.5, 5.4, 8.5), PlayerConfig::default());

        for _ in 0..40 {
            player.update(DT, &idle(), &mut world);
        }

        assert_eq!(player.position().y, 5.0);
        assert_eq!(player.velocity().y, 0.0);
    }

    #[test]
    fn jump_leaves_the_ground() {
        let mut world = floored_world();
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());
        let input = PlayerInput {
            jump: true,
            ..idle()
        };

        player.update(DT, &input, &mut world);

        assert_eq!(player.velocity().y, 8.5);
        assert!((player.position().y - (5.0 + 8.5 * DT)).abs() < 1e-5);
    }

    #[test]
    fn water_damps_vertical_speed() {
        let mut world = World::new(1);
        world.set_block(8, 3, 8, BlockId::Water);
        let mut player = Player::new(Point3::new(8.5, 3.5, 8.5), PlayerConfig::default());

        player.update(DT, &idle(), &mut world);

        let expected = -28.0 * DT * 0.9;
        assert!((player.velocity().y - expected).abs() < 1e-5);
        assert!((player.position().y - (3.5 + expected * DT)).abs() < 1e-5);
    }

    #[test]
    fn movement_follows_the_view_and_is_normalized() {
        let mut world = floored_world();
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());

        player.update(DT, &PlayerInput { forward: true, ..idle() }, &mut world);
        let velocity = player.velocity();
        assert!(velocity.x.abs() < 1e-4);
        assert!((velocity.z + 10.0).abs() < 1e-4, "yaw 0 walks towards -Z");

        let diagonal = PlayerInput {
            forward: true,
            right: true,
            ..idle()
        };
        player.update(DT, &diagonal, &mut world);
        let horizontal = Vector3::new(player.velocity().x, 0.0, player.velocity().z);
        assert!((horizontal.magnitude() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn wall_stops_horizontal_motion() {
        let mut world = floored_world();
        world.set_block(10, 5, 8, BlockId::Stone);
        world.set_block(10, 6, 8, BlockId::Stone);
        let mut player = Player::new(Point3::new(9.5, 5.0, 8.5), PlayerConfig::default());
        player.set_orientation(-FRAC_PI_2, 0.0);

        player.update(DT, &PlayerInput { forward: true, ..idle() }, &mut world);

        assert_eq!(player.velocity().x, 0.0);
        assert_eq!(player.position().x, 9.5);
    }

    #[test]
    fn open_ground_lets_the_player_walk() {
        let mut world = floored_world();
        let mut player = Player::new(Point3::new(9.5, 5.0, 8.5), PlayerConfig::default());
        player.set_orientation(-FRAC_PI_2, 0.0);

        player.update(DT, &PlayerInput { forward: true, ..idle() }, &mut world);

        assert!((player.position().x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn primary_action_breaks_the_first_solid_block_in_reach() {
        let mut world = floored_world();
        world.set_block(8, 6, 7, BlockId::Water);
        world.set_block(8, 6, 5, BlockId::Stone);
        world.set_block(8, 6, 4, BlockId::Dirt);
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());
        let press = PlayerInput {
            primary_action_pressed: true,
            ..idle()
        };

        let broken = player.update(DT, &press, &mut world);

        assert_eq!(broken, Some(Point3::new(8, 6, 5)));
        assert_eq!(world.get_block(8, 6, 5), Some(BlockId::Empty));
        assert_eq!(world.get_block(8, 6, 7), Some(BlockId::Water), "water is skipped");
        assert_eq!(world.get_block(8, 6, 4), Some(BlockId::Dirt), "only one block breaks");
    }

    #[test]
    fn blocks_out_of_reach_survive() {
        let mut world = floored_world();
        world.set_block(8, 6, 1, BlockId::Stone);
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());
        let press = PlayerInput {
            primary_action_pressed: true,
            ..idle()
        };

        assert_eq!(player.update(DT, &press, &mut world), None);
        assert_eq!(world.get_block(8, 6, 1), Some(BlockId::Stone));
    }

    #[test]
    fn without_a_press_nothing_breaks() {
        let mut world = floored_world();
        world.set_block(8, 6, 6, BlockId::Stone);
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());

        assert_eq!(player.update(DT, &idle(), &mut world), None);
        assert_eq!(world.get_block(8, 6, 6), Some(BlockId::Stone));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut world = floored_world();
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());

        let look_up = PlayerInput {
            mouse_delta: (0.0, -10_000.0),
            ..idle()
        };
        player.update(0.1, &look_up, &mut world);
        assert_eq!(player.pitch(), PITCH_LIMIT);

        let look_down = PlayerInput {
            mouse_delta: (0.0, 10_000.0),
            ..idle()
        };
        player.update(0.1, &look_down, &mut world);
        assert_eq!(player.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn mouse_motion_turns_the_player() {
        let mut world = floored_world();
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());
        let input = PlayerInput {
            mouse_delta: (10.0, 0.0),
            ..idle()
        };

        player.update(0.5, &input, &mut world);

        assert!((player.yaw() - -(10.0 * 0.5 * 0.2)).abs() < 1e-6);
    }

    #[test]
    fn camera_sits_at_eye_height() {
        let mut world = floored_world();
        let mut player = Player::new(Point3::new(8.5, 5.0, 8.5), PlayerConfig::default());

        player.update(DT, &PlayerInput { forward: true, ..idle() }, &mut world);

        let expected = player.position() + Vector3::new(0.0, EYE_HEIGHT, 0.0);
        assert_eq!(player.camera().position, expected);
    }

    #[test]
    fn spawn_stands_on_the_centre_column() {
        let mut world = World::new(1);
        for y in 0..4 {
            world.set_block(8, y, 8, BlockId::Grass);
        }

        let player = Player::spawn(&world, PlayerConfig::default());

        assert_eq!(player.position(), Point3::new(8.5, 4.0, 8.5));
        assert_eq!(player.camera().position, Point3::new(8.5, 5.5, 8.5));
    }
}
