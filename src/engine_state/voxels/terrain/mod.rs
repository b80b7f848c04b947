//! # Terrain Generation
//!
//! Procedural terrain for the voxel world. The generator turns world coordinates into
//! block types using a 2D height field built from three coherent noise layers:
//!
//! * **ground**: low frequency base elevation
//! * **scale**: low frequency amplitude modulator, flat plains where it is low and
//!   mountains where it is high
//! * **detail**: high frequency fractal noise, pushed through a signed power curve so
//!   that slopes get steeper towards the extremes, giving plateaus and cliffs
//!
//! Columns are then stratified: air or water above the surface, a surface block chosen
//! by elevation band, a few blocks of dirt, and stone with rare ore pockets below.
//!
//! ## Determinism
//!
//! Every random choice (ore pockets, tree seeds, trunk power) uses a generator seeded
//! from the world seed and the block coordinate, see [`random`]. A seed reproduces the
//! same world no matter which order chunks are generated in.

use cgmath::Point3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::block::block_type::BlockType;
use super::chunk::{CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

pub mod random;

use random::{coordinate_rng, SALT_ORE, SALT_TREE, SALT_TREE_POWER};

/// Noise layer coefficients and stratification thresholds for the terrain generator.
///
/// Any field missing from a configuration file keeps its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Sampling frequency of the ground layer.
    pub ground_frequency: f64,
    /// Maximum deviation of the base elevation from zero, in blocks.
    pub ground_amplitude: f64,
    /// Sampling frequency of the amplitude modulator.
    pub scale_frequency: f64,
    /// Largest amplitude the detail layer can be scaled to, in blocks.
    pub scale_amplitude: f64,
    /// Sampling frequency of the first detail octave.
    pub detail_frequency: f64,
    /// Number of fractal octaves in the detail layer.
    pub detail_octaves: usize,
    /// Exponent of the signed power curve applied to the detail layer.
    /// `1.0` leaves it untouched, larger values flatten the middle and steepen the ends.
    pub detail_sharpness: f64,
    /// Highest y filled with water in open air.
    pub water_level: i32,
    /// Surface heights at or above this become snow and grow no trees.
    pub snow_line: i32,
    /// Number of dirt blocks between the surface and the stone.
    pub subsoil_depth: i32,
    /// Probability that a grass surface block carries a tree trunk.
    pub tree_chance: f64,
    /// Smallest initial growth power of a generated trunk.
    pub tree_power_min: i32,
    /// Largest initial growth power of a generated trunk.
    pub tree_power_max: i32,
    /// Probability that a stone block is coal ore.
    pub coal_chance: f64,
    /// Probability that a stone block is iron ore.
    pub iron_chance: f64,
    /// Probability that a stone block is gold ore.
    pub gold_chance: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            ground_frequency: 0.002,
            ground_amplitude: 24.0,
            scale_frequency: 0.005,
            scale_amplitude: 48.0,
            detail_frequency: 0.01,
            detail_octaves: 6,
            detail_sharpness: 1.5,
            water_level: 0,
            snow_line: 40,
            subsoil_depth: 3,
            tree_chance: 1.0 / 300.0,
            tree_power_min: 7,
            tree_power_max: 13,
            coal_chance: 0.04,
            iron_chance: 0.015,
            gold_chance: 0.004,
        }
    }
}

/// Signed power curve. Keeps the sign and the `[-1, 1]` range of `value`.
fn sharpen(value: f64, exponent: f64) -> f64 {
    value.signum() * value.abs().powf(exponent)
}

/// Generates block types for world coordinates.
///
/// The generator works one chunk footprint at a time: [`TerrainGenerator::init`]
/// caches the height field for a 32x32 column area, after which
/// [`TerrainGenerator::block_at`] answers queries inside that area from the cache.
pub struct TerrainGenerator {
    config: TerrainConfig,
    seed: u32,
    ground: Perlin,
    scale: Perlin,
    detail: Fbm<Perlin>,
    /// Offset added to every noise sample so that different seeds look different
    /// even near the origin, where Perlin noise is pinned to zero.
    start: [f64; 2],
    /// World (x, z) of the cached footprint's lowest corner.
    origin: Option<(i32, i32)>,
    /// Surface heights for the cached footprint, indexed `z * CHUNK_DIMENSION + x`.
    heights: Vec<i32>,
}

impl TerrainGenerator {
    /// Creates a generator for the given world seed.
    pub fn new(seed: u32, config: TerrainConfig) -> Self {
        let mut start_rng = fastrand::Rng::with_seed(seed as u64);
        let start = [start_rng.f64() * 10_000.0, start_rng.f64() * 10_000.0];
        let detail = Fbm::<Perlin>::new(seed.wrapping_add(2)).set_octaves(config.detail_octaves);

        Self {
            seed,
            ground: Perlin::new(seed.wrapping_add(1)),
            scale: Perlin::new(seed),
            detail,
            start,
            origin: None,
            heights: vec![0; CHUNK_PLANE_SIZE as usize],
            config,
        }
    }

    /// The configuration this generator was built with.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// The world seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Precomputes the height field for the chunk footprint starting at
    /// (`origin_x`, `origin_z`) in world coordinates.
    pub fn init(&mut self, origin_x: i32, origin_z: i32) {
        if self.origin == Some((origin_x, origin_z)) {
            return;
        }
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                self.heights[(z * CHUNK_DIMENSION + x) as usize] =
                    self.surface_height(origin_x + x, origin_z + z);
            }
        }
        self.origin = Some((origin_x, origin_z));
    }

    /// Computes the surface height of a column directly from the noise layers.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let c = &self.config;
        let (x, z) = (x as f64, z as f64);
        let sample = |frequency: f64| [x * frequency + self.start[0], z * frequency + self.start[1]];

        let ground = self.ground.get(sample(c.ground_frequency)) * c.ground_amplitude;
        let scale = (self.scale.get(sample(c.scale_frequency)) * 0.5 + 0.5) * c.scale_amplitude;
        let detail = self
            .detail
            .get(sample(c.detail_frequency))
            .clamp(-1.0, 1.0);

        (ground + sharpen(detail, c.detail_sharpness) * scale).floor() as i32
    }

    /// Surface height of a column, served from the cache when the column lies inside
    /// the last initialized footprint.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        if let Some((origin_x, origin_z)) = self.origin {
            let (local_x, local_z) = (x - origin_x, z - origin_z);
            if (0..CHUNK_DIMENSION).contains(&local_x) && (0..CHUNK_DIMENSION).contains(&local_z) {
                return self.heights[(local_z * CHUNK_DIMENSION + local_x) as usize];
            }
        }
        self.surface_height(x, z)
    }

    /// Returns the block at a world position.
    ///
    /// Meant to be called for columns inside the footprint passed to the last
    /// [`TerrainGenerator::init`]. Other columns are answered correctly but without
    /// the cache.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        let c = &self.config;
        let height = self.height_at(x, z);

        if y > height {
            if y <= c.water_level {
                return BlockType::WATER;
            }
            if y == height + 1
                && height > c.water_level
                && height < c.snow_line
                && coordinate_rng(self.seed, Point3::new(x, y, z), SALT_TREE).f64() < c.tree_chance
            {
                return BlockType::WOOD;
            }
            BlockType::AIR
        } else if y == height {
            if height >= c.snow_line {
                BlockType::SNOW
            } else if y > c.water_level {
                BlockType::GRASS
            } else if y == c.water_level {
                BlockType::SAND
            } else {
                BlockType::DIRT
            }
        } else if y >= height - c.subsoil_depth {
            BlockType::DIRT
        } else {
            let roll = coordinate_rng(self.seed, Point3::new(x, y, z), SALT_ORE).f64();
            if roll < c.gold_chance {
                BlockType::GOLD_ORE
            } else if roll < c.gold_chance + c.iron_chance {
                BlockType::IRON_ORE
            } else if roll < c.gold_chance + c.iron_chance + c.coal_chance {
                BlockType::COAL_ORE
            } else {
                BlockType::STONE
            }
        }
    }

    /// Initial growth power for a trunk generated at `position`.
    pub fn tree_power_at(&self, position: Point3<i32>) -> i32 {
        let (min, max) = (self.config.tree_power_min, self.config.tree_power_max.max(self.config.tree_power_min));
        coordinate_rng(self.seed, position, SALT_TREE_POWER).i32(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_ore(block: BlockType) -> bool {
        matches!(
            block,
            BlockType::COAL_ORE | BlockType::IRON_ORE | BlockType::GOLD_ORE
        )
    }

    #[test]
    fn columns_are_stratified() {
        let mut generator = TerrainGenerator::new(7, TerrainConfig::default());
        let config = generator.config().clone();
        generator.init(64, -32);

        for (x, z) in [(64, -32), (70, -20), (95, -1), (80, -17)] {
            let height = generator.height_at(x, z);
            for y in (height - 30)..=(height + 30) {
                let block = generator.block_at(x, y, z);
                if y > height {
                    match block {
                        BlockType::AIR => assert!(y > config.water_level),
                        BlockType::WATER => assert!(y <= config.water_level),
                        BlockType::WOOD => assert_eq!(y, height + 1),
                        other => panic!("{:?} above the surface at y={}", other, y),
                    }
                } else if y == height {
                    let expected = if height >= config.snow_line {
                        BlockType::SNOW
                    } else if height > config.water_level {
                        BlockType::GRASS
                    } else if height == config.water_level {
                        BlockType::SAND
                    } else {
                        BlockType::DIRT
                    };
                    assert_eq!(block, expected);
                } else if y >= height - config.subsoil_depth {
                    assert_eq!(block, BlockType::DIRT);
                } else {
                    assert!(block == BlockType::STONE || is_ore(block), "{:?} at depth", block);
                }
            }
        }
    }

    #[test]
    fn same_seed_builds_the_same_world_in_any_order() {
        let mut first = TerrainGenerator::new(1234, TerrainConfig::default());
        let mut second = TerrainGenerator::new(1234, TerrainConfig::default());

        // Prime the second generator with a different footprint first.
        second.init(320, 320);
        first.init(0, 0);
        second.init(0, 0);

        for x in 0..CHUNK_DIMENSION {
            for z in (0..CHUNK_DIMENSION).step_by(5) {
                let height = first.height_at(x, z);
                assert_eq!(height, second.height_at(x, z));
                for y in (height - 10)..(height + 3) {
                    assert_eq!(first.block_at(x, y, z), second.block_at(x, y, z));
                }
            }
        }
    }

    #[test]
    fn cached_heights_match_direct_evaluation() {
        let mut generator = TerrainGenerator::new(3, TerrainConfig::default());
        generator.init(-32, 96);
        for (x, z) in [(-32, 96), (-1, 127), (-20, 100)] {
            assert_eq!(generator.height_at(x, z), generator.surface_height(x, z));
        }
    }

    #[test]
    fn ore_rarity_is_ordered() {
        let config = TerrainConfig {
            subsoil_depth: 0,
            ..TerrainConfig::default()
        };
        let mut generator = TerrainGenerator::new(11, config);
        generator.init(0, 0);

        let (mut coal, mut iron, mut gold) = (0, 0, 0);
        for x in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                let height = generator.height_at(x, z);
                for y in (height - 200)..(height - 1) {
                    match generator.block_at(x, y, z) {
                        BlockType::COAL_ORE => coal += 1,
                        BlockType::IRON_ORE => iron += 1,
                        BlockType::GOLD_ORE => gold += 1,
                        _ => {}
                    }
                }
            }
        }
        assert!(coal > iron, "coal {} iron {}", coal, iron);
        assert!(iron > gold, "iron {} gold {}", iron, gold);
        assert!(gold > 0);
    }

    #[test]
    fn tree_power_stays_in_range() {
        let generator = TerrainGenerator::new(5, TerrainConfig::default());
        for i in 0..200 {
            let power = generator.tree_power_at(Point3::new(i, 3, -i));
            assert!((7..=13).contains(&power));
        }
    }

    #[test]
    fn sharpen_keeps_sign_and_range() {
        assert_eq!(sharpen(0.0, 2.0), 0.0);
        assert_eq!(sharpen(1.0, 2.0), 1.0);
        assert_eq!(sharpen(-1.0, 2.0), -1.0);
        assert!((sharpen(-0.5, 2.0) + 0.25).abs() < 1e-12);
    }
}
