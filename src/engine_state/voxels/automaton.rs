//! # Block Automaton
//!
//! Local rules that make trees grow and water flow. Every chunk keeps a work list of
//! live blocks, each with a power value. A tick processes a bounded number of items per
//! chunk, picked at random, and each item may place blocks and queue new items with
//! less power, until the power runs out.
//!
//! | Block  | Rule |
//! |--------|------|
//! | WOOD   | grows one block up while it has power; in the leaf band, surrounds itself with leaves |
//! | LEAVES | spreads sideways into air, losing one power per step |
//! | WATER  | falls one block if it can, otherwise copies itself sideways into air |
//!
//! The simulation is order sensitive and best effort: processing items in a different
//! order can give a slightly different tree or pond.

use cgmath::{EuclideanSpace, Point3, Vector3};
use log::trace;
use serde::{Deserialize, Serialize};

use super::block::{block_side::BlockSide, block_type::BlockType};
use super::world::World;

/// Automaton tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    /// Work items processed per chunk per tick.
    pub updates_per_chunk: usize,
    /// Trunks with power below this grow leaves.
    pub leaf_band_top: i32,
    /// Seed of the random item picker.
    pub seed: u64,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            updates_per_chunk: 10,
            leaf_band_top: 8,
            seed: 0x5eed,
        }
    }
}

/// Applies the block rules to the live blocks of every loaded chunk.
pub struct BlockAutomaton {
    config: AutomatonConfig,
    rng: fastrand::Rng,
}

impl BlockAutomaton {
    /// Creates an automaton with its own seeded item picker.
    pub fn new(config: AutomatonConfig) -> Self {
        let rng = fastrand::Rng::with_seed(config.seed);
        BlockAutomaton { config, rng }
    }

    /// Runs one automaton pass over every loaded chunk.
    ///
    /// Items queued during the pass may be picked in the same pass if their chunk still
    /// has updates left.
    ///
    /// # Returns
    /// The number of work items processed.
    pub fn tick(&mut self, world: &mut World) -> usize {
        let mut processed = 0;
        for grid in world.grids() {
            for _ in 0..self.config.updates_per_chunk {
                let item = world.lookup_mut(grid).and_then(|chunk| {
                    let origin = chunk.world_origin();
                    chunk
                        .take_random_live_block(&mut self.rng)
                        .map(|item| (origin + item.position.to_vec(), item.power))
                });
                let Some((position, power)) = item else {
                    break;
                };
                self.apply(world, position, power);
                processed += 1;
            }
        }
        if processed > 0 {
            trace!("Automaton processed {} live blocks", processed);
        }
        processed
    }

    /// Applies the rule for whatever block is at `position` now.
    fn apply(&self, world: &mut World, position: Point3<i32>, power: i32) {
        match world.loaded_block_at(position) {
            Some(BlockType::WOOD) => {
                let above = position + Vector3::unit_y();
                if power > 0 && world.loaded_block_at(above) == Some(BlockType::AIR) {
                    world.set_block_at(above, BlockType::WOOD);
                    world.push_live_block(above, power - 1);
                }
                if power > 0 && power < self.config.leaf_band_top {
                    Self::spread(world, position, BlockType::LEAVES, power / 4);
                }
            }
            Some(BlockType::LEAVES) => {
                if power > 0 {
                    Self::spread(world, position, BlockType::LEAVES, power - 1);
                }
            }
            Some(BlockType::WATER) => {
                let below = position - Vector3::unit_y();
                match world.loaded_block_at(below) {
                    Some(BlockType::AIR) => {
                        world.set_block_at(below, BlockType::WATER);
                        world.set_block_at(position, BlockType::AIR);
                        world.push_live_block(below, power);
                    }
                    Some(_) => Self::spread(world, position, BlockType::WATER, power),
                    // Nothing is known about the floor yet; the water stays put.
                    None => {}
                }
            }
            _ => {}
        }
    }

    /// Fills the horizontal air neighbors of `position` and queues them.
    fn spread(world: &mut World, position: Point3<i32>, block_type: BlockType, power: i32) {
        for side in BlockSide::horizontal() {
            let target = position + side.offset();
            if world.loaded_block_at(target) == Some(BlockType::AIR) {
                world.set_block_at(target, block_type);
                world.push_live_block(target, power);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::Chunk;

    fn empty_world() -> World {
        let mut world = World::default();
        world.insert(Chunk::empty(Point3::new(0, 0, 0)));
        world
    }

    fn automaton() -> BlockAutomaton {
        BlockAutomaton::new(AutomatonConfig::default())
    }

    fn place(world: &mut World, position: Point3<i32>, block_type: BlockType, power: i32) {
        world.set_block_at(position, block_type);
        world.push_live_block(position, power);
    }

    fn count(world: &World, block_type: BlockType) -> usize {
        world
            .chunks()
            .map(|chunk| chunk.iter_blocks().filter(|(_, b)| *b == block_type).count())
            .sum()
    }

    #[test]
    fn spent_wood_under_a_roof_is_terminal() {
        let mut world = empty_world();
        place(&mut world, Point3::new(4, 4, 4), BlockType::WOOD, 0);
        world.set_block_at(Point3::new(4, 5, 4), BlockType::STONE);

        assert_eq!(automaton().tick(&mut world), 1);
        assert_eq!(world.active_block_count(), 0);
        assert_eq!(count(&world, BlockType::WOOD), 1);
        assert_eq!(count(&world, BlockType::LEAVES), 0);
    }

    #[test]
    fn water_falls_one_block() {
        let mut world = empty_world();
        place(&mut world, Point3::new(8, 10, 8), BlockType::WATER, 3);
        let mut automaton = BlockAutomaton::new(AutomatonConfig {
            updates_per_chunk: 1,
            ..AutomatonConfig::default()
        });
        automaton.tick(&mut world);

        assert_eq!(count(&world, BlockType::WATER), 1);
        assert_eq!(world.loaded_block_at(Point3::new(8, 10, 8)), Some(BlockType::AIR));
        assert_eq!(world.loaded_block_at(Point3::new(8, 9, 8)), Some(BlockType::WATER));
        let live = world.lookup(Point3::new(0, 0, 0)).unwrap().live_blocks();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].position, Point3::new(8, 9, 8));
        assert_eq!(live[0].power, 3);
    }

    #[test]
    fn water_on_the_ground_spreads_only_into_air() {
        let mut world = empty_world();
        for x in 0..32 {
            for z in 0..32 {
                world.set_block_at(Point3::new(x, 0, z), BlockType::STONE);
            }
        }
        world.set_block_at(Point3::new(6, 1, 5), BlockType::BRICKS);
        place(&mut world, Point3::new(5, 1, 5), BlockType::WATER, 1);

        let mut automaton = BlockAutomaton::new(AutomatonConfig {
            updates_per_chunk: 1,
            ..AutomatonConfig::default()
        });
        automaton.tick(&mut world);

        assert_eq!(world.loaded_block_at(Point3::new(6, 1, 5)), Some(BlockType::BRICKS));
        assert_eq!(world.loaded_block_at(Point3::new(5, 1, 5)), Some(BlockType::WATER));
        for p in [Point3::new(4, 1, 5), Point3::new(5, 1, 4), Point3::new(5, 1, 6)] {
            assert_eq!(world.loaded_block_at(p), Some(BlockType::WATER));
        }
        // Diagonals are not neighbors.
        assert_eq!(world.loaded_block_at(Point3::new(4, 1, 4)), Some(BlockType::AIR));
        assert_eq!(count(&world, BlockType::WATER), 4);
        assert_eq!(count(&world, BlockType::STONE), 32 * 32);
        assert_eq!(world.active_block_count(), 3);
    }

    #[test]
    fn water_over_unloaded_space_stays_put() {
        let mut world = empty_world();
        place(&mut world, Point3::new(5, 0, 5), BlockType::WATER, 1);
        let mut automaton = automaton();
        for _ in 0..2000 {
            automaton.tick(&mut world);
        }
        assert_eq!(world.loaded_block_at(Point3::new(5, 0, 5)), Some(BlockType::WATER));
        assert_eq!(count(&world, BlockType::WATER), 1);
        assert_eq!(world.active_block_count(), 0);
        assert!(world.loaded_block_at(Point3::new(5, -1, 5)).is_none());
    }

    #[test]
    fn water_falls_into_a_loaded_chunk_below() {
        let mut world = empty_world();
        world.insert(Chunk::empty(Point3::new(0, -1, 0)));
        place(&mut world, Point3::new(5, 0, 5), BlockType::WATER, 1);
        let mut automaton = BlockAutomaton::new(AutomatonConfig {
            updates_per_chunk: 1,
            ..AutomatonConfig::default()
        });
        automaton.tick(&mut world);
        assert_eq!(world.loaded_block_at(Point3::new(5, 0, 5)), Some(BlockType::AIR));
        assert_eq!(count(&world, BlockType::WATER), 1);
        let below = world.lookup(Point3::new(0, -1, 0)).unwrap();
        assert_eq!(below.iter_blocks().count(), 1);
    }

    #[test]
    fn a_seeded_tree_grows_a_trunk_and_a_canopy() {
        let mut world = empty_world();
        place(&mut world, Point3::new(5, 10, 5), BlockType::WOOD, 8);
        let mut automaton = automaton();

        let mut saw_both = false;
        for _ in 0..200 {
            automaton.tick(&mut world);
            let chunk = world.lookup(Point3::new(0, 0, 0)).unwrap();
            let live = chunk.live_blocks();
            assert!(live.len() <= 100);
            assert!(live.iter().all(|item| item.power >= 0));
            let has = |block_type| {
                live.iter()
                    .any(|item| chunk.get_block_at(item.position.x, item.position.y, item.position.z) == block_type)
            };
            saw_both |= has(BlockType::WOOD) && has(BlockType::LEAVES);
        }

        assert!(saw_both);
        assert_eq!(world.active_block_count(), 0);
        for y in 10..=18 {
            assert_eq!(world.loaded_block_at(Point3::new(5, y, 5)), Some(BlockType::WOOD));
        }
        assert_eq!(world.loaded_block_at(Point3::new(5, 19, 5)), Some(BlockType::AIR));
        let leaves = count(&world, BlockType::LEAVES);
        assert!(leaves > 0 && leaves <= 84, "{} leaves", leaves);
        assert_eq!(world.loaded_block_at(Point3::new(6, 10, 5)), Some(BlockType::AIR));
        assert_eq!(world.loaded_block_at(Point3::new(6, 11, 5)), Some(BlockType::LEAVES));
    }
}
