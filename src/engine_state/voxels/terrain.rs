//! # Terrain Generation
//!
//! Column-based terrain: each `(x, z)` column gets a stone layer and a dirt layer whose
//! thicknesses come from octave noise, then either a grass cap or water up to the water
//! table. An optional 3D noise band replaces solid cells with a configured block to form
//! pockets or caves.

use noise::{NoiseFn, Perlin};

use super::{block::block_type::BlockId, world::World};
use crate::config::{GenerationConfig, PocketConfig};

/// Coherent noise sampled by the generator.
///
/// Implementations must be deterministic: identical inputs give identical outputs.
pub trait NoiseSource {
    /// Octave noise over a plane, in `[0, 1]`.
    fn octave_2d_01(&self, x: f64, z: f64, octaves: u32) -> f64;

    /// Octave noise over a volume, in `[0, 1]`.
    fn octave_3d_01(&self, x: f64, y: f64, z: f64, octaves: u32) -> f64;
}

/// Fractal Perlin noise: each octave doubles the frequency and halves the amplitude.
///
/// The raw sum is remapped from `[-1, 1]` to `[0, 1]` and clamped.
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    /// Amplitude multiplier between octaves.
    pub const PERSISTENCE: f64 = 0.5;

    /// Creates a noise source from a seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    fn remap_01(value: f64) -> f64 {
        (value * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

impl NoiseSource for PerlinNoise {
    fn octave_2d_01(&self, x: f64, z: f64, octaves: u32) -> f64 {
        let mut result = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..octaves.max(1) {
            result += self.perlin.get([x * frequency, z * frequency]) * amplitude;
            frequency *= 2.0;
            amplitude *= Self::PERSISTENCE;
        }

        Self::remap_01(result)
    }

    fn octave_3d_01(&self, x: f64, y: f64, z: f64, octaves: u32) -> f64 {
        let mut result = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..octaves.max(1) {
            result += self
                .perlin
                .get([x * frequency, y * frequency, z * frequency])
                * amplitude;
            frequency *= 2.0;
            amplitude *= Self::PERSISTENCE;
        }

        Self::remap_01(result)
    }
}

/// Layer heights of one terrain column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnProfile {
    /// First height above the stone layer
    pub stone_top: i32,
    /// First height above the dirt layer
    pub dirt_top: i32,
}

impl ColumnProfile {
    /// Samples the layer heights of column `(x, z)`.
    pub fn sample<N: NoiseSource + ?Sized>(
        config: &GenerationConfig,
        noise: &N,
        x: i32,
        z: i32,
    ) -> Self {
        let (x, z) = (f64::from(x), f64::from(z));

        let stone = noise.octave_2d_01(
            x * config.stone_scale,
            z * config.stone_scale,
            config.stone_octaves,
        );
        let dirt = noise.octave_2d_01(
            x * config.dirt_scale,
            z * config.dirt_scale,
            config.dirt_octaves,
        );

        let stone_top = (stone * config.stone_height) as i32;
        Self {
            stone_top,
            dirt_top: stone_top + (dirt * config.dirt_height) as i32,
        }
    }

    /// Block at height `y` before any pocket pass.
    pub fn block_at(&self, y: i32, water_height: i32) -> BlockId {
        if y < self.stone_top {
            BlockId::Stone
        } else if y < self.dirt_top {
            BlockId::Dirt
        } else if self.is_flooded(water_height) {
            if y < water_height {
                BlockId::Water
            } else {
                BlockId::Empty
            }
        } else if y == self.dirt_top {
            BlockId::Grass
        } else {
            BlockId::Empty
        }
    }

    /// Whether the column's dirt ends far enough below the water table to be submerged.
    pub fn is_flooded(&self, water_height: i32) -> bool {
        self.dirt_top + 1 < water_height
    }

    /// First height above every non-empty block of the column.
    pub fn top(&self, water_height: i32) -> i32 {
        if self.is_flooded(water_height) {
            water_height
        } else {
            self.dirt_top + 1
        }
    }
}

fn apply_pocket<N: NoiseSource + ?Sized>(
    pockets: &PocketConfig,
    noise: &N,
    block: BlockId,
    x: i32,
    y: i32,
    z: i32,
) -> BlockId {
    if matches!(block, BlockId::Empty | BlockId::Water) {
        return block;
    }

    let density = noise.octave_3d_01(
        f64::from(x) * pockets.scale,
        f64::from(y) * pockets.scale,
        f64::from(z) * pockets.scale,
        pockets.octaves,
    );

    if density > pockets.lower && density < pockets.upper {
        pockets.block
    } else {
        block
    }
}

/// Writes the terrain of every column into an empty `world`.
pub(crate) fn fill_terrain<N: NoiseSource + ?Sized>(
    world: &mut World,
    config: &GenerationConfig,
    noise: &N,
) {
    let extent = world.extent();
    let pockets = config.pockets.enabled.then_some(&config.pockets);

    for z in 0..extent {
        for x in 0..extent {
            let column = ColumnProfile::sample(config, noise, x, z);
            let top = column.top(config.water_height).clamp(0, extent);

            for y in 0..top {
                let mut block = column.block_at(y, config.water_height);
                if let Some(pockets) = pockets {
                    block = apply_pocket(pockets, noise, block, x, y, z);
                }
                if !block.is_empty() {
                    world.write_block(x, y, z, block);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantNoise(f64);

    impl NoiseSource for ConstantNoise {
        fn octave_2d_01(&self, _x: f64, _z: f64, _octaves: u32) -> f64 {
            self.0
        }

        fn octave_3d_01(&self, _x: f64, _y: f64, _z: f64, _octaves: u32) -> f64 {
            self.0
        }
    }

    fn blocks_of(world: &World) -> Vec<Option<BlockId>> {
        let extent = world.extent();
        let mut blocks = Vec::new();
        for z in 0..extent {
            for y in 0..extent {
                for x in 0..extent {
                    blocks.push(world.get_block(x, y, z));
                }
            }
        }
        blocks
    }

    #[test]
    fn perlin_noise_stays_in_unit_range() {
        let noise = PerlinNoise::new(7);
        for i in 0..200 {
            let t = f64::from(i) * 0.37;
            let planar = noise.octave_2d_01(t, t * 0.5, 4);
            let volumetric = noise.octave_3d_01(t, -t, t * 0.25, 5);
            assert!((0.0..=1.0).contains(&planar));
            assert!((0.0..=1.0).contains(&volumetric));
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let config = GenerationConfig::default();
        let mut first = World::new(2);
        let mut second = World::new(2);

        first.generate(&config, &PerlinNoise::new(config.seed));
        second.generate(&config, &PerlinNoise::new(config.seed));

        assert_eq!(blocks_of(&first), blocks_of(&second));
    }

    #[test]
    fn regenerating_the_same_world_clears_old_blocks() {
        let config = GenerationConfig::default();
        let noise = PerlinNoise::new(config.seed);
        let mut world = World::new(2);
        world.generate(&config, &noise);
        let expected = blocks_of(&world);

        world.set_block(5, 30, 5, BlockId::Planks);
        world.generate(&config, &noise);

        assert_eq!(blocks_of(&world), expected);
        assert_eq!(world.dirty_chunk_count(), 8);
    }

    #[test]
    fn dry_column_is_stone_dirt_then_grass() {
        let config = GenerationConfig::default();
        let mut world = World::new(2);
        world.generate(&config, &ConstantNoise(0.5));

        // stone 0.5 * 14 = 7, dirt 7 + 0.5 * 8 = 11, which is not below the water table
        assert_eq!(world.get_block(3, 0, 3), Some(BlockId::Stone));
        assert_eq!(world.get_block(3, 6, 3), Some(BlockId::Stone));
        assert_eq!(world.get_block(3, 7, 3), Some(BlockId::Dirt));
        assert_eq!(world.get_block(3, 10, 3), Some(BlockId::Dirt));
        assert_eq!(world.get_block(3, 11, 3), Some(BlockId::Grass));
        assert_eq!(world.get_block(3, 12, 3), Some(BlockId::Empty));
        assert_eq!(world.surface_height(3, 3), Some(11));
    }

    #[test]
    fn low_column_is_flooded_up_to_the_water_table() {
        let config = GenerationConfig::default();
        let mut world = World::new(1);
        world.generate(&config, &ConstantNoise(0.25));

        // stone 3, dirt 3 + 2 = 5, water fills [5, 11)
        assert_eq!(world.get_block(0, 2, 0), Some(BlockId::Stone));
        assert_eq!(world.get_block(0, 4, 0), Some(BlockId::Dirt));
        assert_eq!(world.get_block(0, 5, 0), Some(BlockId::Water));
        assert_eq!(world.get_block(0, 10, 0), Some(BlockId::Water));
        assert_eq!(world.get_block(0, 11, 0), Some(BlockId::Empty));
    }

    #[test]
    fn pockets_replace_solid_cells_inside_the_band() {
        let mut config = GenerationConfig::default();
        config.pockets.enabled = true;
        let mut world = World::new(1);
        world.generate(&config, &ConstantNoise(0.5));

        assert_eq!(world.get_block(1, 0, 1), Some(BlockId::Log));
        assert_eq!(world.get_block(1, 8, 1), Some(BlockId::Log));
        assert_eq!(world.get_block(1, 12, 1), Some(BlockId::Empty));
    }

    #[test]
    fn terrain_is_clamped_to_the_world_height() {
        let config = GenerationConfig {
            stone_height: 100.0,
            ..GenerationConfig::default()
        };
        let mut world = World::new(1);
        world.generate(&config, &ConstantNoise(1.0));

        assert_eq!(world.get_block(0, 15, 0), Some(BlockId::Stone));
    }
}
