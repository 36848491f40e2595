//! # Engine Configuration
//!
//! Runtime settings loaded from a JSON file. Every section falls back to its defaults, so a
//! partial file (or no file at all) is valid. The terrain parameters in
//! [`GenerationConfig`] are the live-tunable values re-read when the world is regenerated
//! from debug mode.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::block::block_type::BlockId;
use crate::error::{EngineError, Result};

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "MINICRAFT_CONFIG";
/// Configuration file looked up in the working directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "minicraft.json";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window creation settings
    pub window: WindowConfig,
    /// World dimensions
    pub world: WorldConfig,
    /// Terrain generation parameters
    pub generation: GenerationConfig,
    /// Player physics tuning
    pub player: PlayerConfig,
    /// Camera projection settings
    pub camera: CameraConfig,
}

impl EngineConfig {
    /// Resolves the configuration path from [`CONFIG_PATH_ENV`] or [`DEFAULT_CONFIG_FILE`].
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Loads the configuration at `path`.
    ///
    /// A missing file yields the defaults. A file that exists but does not parse is an error,
    /// so a typo never silently resets every parameter.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses a configuration from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot build a world from.
    pub fn validate(&self) -> Result<()> {
        self.world.validate()
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial inner width in logical pixels
    pub width: u32,
    /// Initial inner height in logical pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("Minicraft"),
            width: 1280,
            height: 720,
        }
    }
}

/// World dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of chunks along each axis.
    pub world_size: usize,
}

impl WorldConfig {
    /// Largest accepted `world_size`. 32³ chunks hold 2²⁷ blocks.
    pub const MAX_WORLD_SIZE: usize = 32;

    /// Checks that `world_size` is in `1..=MAX_WORLD_SIZE`.
    pub fn validate(&self) -> Result<()> {
        if (1..=Self::MAX_WORLD_SIZE).contains(&self.world_size) {
            Ok(())
        } else {
            Err(EngineError::WorldSize {
                world_size: self.world_size,
                max: Self::MAX_WORLD_SIZE,
            })
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { world_size: 8 }
    }
}

/// Terrain synthesis parameters.
///
/// Heights are measured in blocks. The scales multiply global block coordinates before they
/// are fed to the noise source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed for the noise permutation table
    pub seed: u32,
    /// Horizontal frequency of the stone layer
    pub stone_scale: f64,
    /// Octaves summed for the stone layer
    pub stone_octaves: u32,
    /// Maximum stone thickness
    pub stone_height: f64,
    /// Horizontal frequency of the dirt layer
    pub dirt_scale: f64,
    /// Octaves summed for the dirt layer
    pub dirt_octaves: u32,
    /// Maximum dirt thickness on top of the stone
    pub dirt_height: f64,
    /// Water fills every column whose dirt ends below this height
    pub water_height: i32,
    /// Optional 3D pockets
    pub pockets: PocketConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            stone_scale: 0.02,
            stone_octaves: 4,
            stone_height: 14.0,
            dirt_scale: 0.07,
            dirt_octaves: 2,
            dirt_height: 8.0,
            water_height: 11,
            pockets: PocketConfig::default(),
        }
    }
}

/// 3D noise band that replaces solid ground.
///
/// With `block` set to [`BlockId::Log`] this scatters isolated pockets through the terrain;
/// with [`BlockId::Empty`] it carves caves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PocketConfig {
    /// Whether the pass runs at all
    pub enabled: bool,
    /// Frequency applied to all three coordinates
    pub scale: f64,
    /// Octaves summed
    pub octaves: u32,
    /// Exclusive lower bound of the band
    pub lower: f64,
    /// Exclusive upper bound of the band
    pub upper: f64,
    /// Block written inside the band
    pub block: BlockId,
}

impl Default for PocketConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scale: 0.1,
            octaves: 5,
            lower: 0.3,
            upper: 0.6,
            block: BlockId::Log,
        }
    }
}

/// Player physics tuning. Speeds are in blocks per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal walking speed
    pub move_speed: f32,
    /// Downward acceleration in blocks per second squared
    pub gravity: f32,
    /// Upward velocity applied when jumping or swimming
    pub jump_speed: f32,
    /// Factor applied to vertical velocity each tick spent in water
    pub water_damping: f32,
    /// Radians of rotation per pixel per second of mouse movement
    pub mouse_sensitivity: f32,
    /// Maximum block-breaking distance
    pub reach: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            gravity: 28.0,
            jump_speed: 8.5,
            water_damping: 0.9,
            mouse_sensitivity: 0.2,
            reach: 5.0,
        }
    }
}

/// Perspective projection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub znear: f32,
    /// Far clipping plane
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            znear: 0.05,
            zfar: 500.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "generation": { "seed": 42, "water_height": 9 } }"#)
                .unwrap();

        assert_eq!(config.generation.seed, 42);
        assert_eq!(config.generation.water_height, 9);
        assert_eq!(config.generation.stone_octaves, 4);
        assert_eq!(config.world, WorldConfig::default());
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let mut config = EngineConfig::default();
        config.generation.pockets.enabled = true;
        config.generation.pockets.block = BlockId::Empty;
        config.player.reach = 7.5;

        let parsed = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn unusable_world_sizes_are_rejected() {
        for size in [0, WorldConfig::MAX_WORLD_SIZE + 1, 1300, usize::MAX] {
            let json = format!(r#"{{ "world": {{ "world_size": {size} }} }}"#);
            let result = EngineConfig::from_json(&json);
            assert!(
                matches!(result, Err(EngineError::WorldSize { world_size, .. }) if world_size == size),
                "world_size {size} should be rejected"
            );
        }

        let largest = format!(
            r#"{{ "world": {{ "world_size": {} }} }}"#,
            WorldConfig::MAX_WORLD_SIZE
        );
        assert!(EngineConfig::from_json(&largest).is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = EngineConfig::load(Path::new("does/not/exist/minicraft.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
