//! # Engine State Module
//!
//! The core engine module that owns the voxel world and advances it one tick at a time.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `config` - Engine configuration and its validation
//! * `player` - The walking body whose position drives streaming
//! * `rendering` - Chunk models, mesh generation and the draw list
//! * `voxels` - Blocks, chunks, terrain, the chunk registry and the block automaton
//!
//! ## Tick Phases
//!
//! Every tick runs the same fixed sequence on the calling thread:
//!
//! 1. **Input**: the player moves and may dig
//! 2. **Stream**: missing chunks near the player are generated and registered
//! 3. **Evict**: far chunks leave the draw list, then the registry, then memory
//! 4. **Rebuild**: dirty chunks are re-meshed until the non-empty rebuild budget is spent
//! 5. **Automaton**: a bounded number of live blocks per chunk are processed
//!
//! The set of loaded chunks only changes in the stream and evict phases, so the rebuild
//! and automaton passes can walk it without it changing under them.

use std::fmt;

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, info};
use web_time::Instant;

use config::EngineConfig;
use player::{Player, PlayerInput};
use rendering::{surface::SurfaceFactory, DrawList};
use voxels::{
    automaton::BlockAutomaton,
    block::block_type::BlockType,
    terrain::TerrainGenerator,
    world::{block_of_point, chunk_of_point, World},
};

pub mod config;
pub mod player;
pub mod rendering;
pub mod voxels;

/// Ticks between two statistics log lines.
const STATS_INTERVAL: u64 = 60;
/// Ray march steps of a dig.
const DIG_STEPS: usize = 100;
/// Distance covered by one ray march step.
const DIG_STEP_LENGTH: f32 = 0.1;
/// Power of the live blocks queued around a dug block.
const DIG_WAKE_POWER: i32 = 1;

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Chunks generated and registered
    pub generated: usize,
    /// Chunks evicted and destroyed
    pub evicted: usize,
    /// Chunks whose models were rebuilt
    pub rebuilt: usize,
    /// Live blocks processed by the automaton
    pub block_updates: usize,
}

/// A snapshot of the world for the status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldStats {
    /// Feet position of the player
    pub player_position: Point3<f32>,
    /// Block containing the player's feet
    pub player_block: Point3<i32>,
    /// Chunk containing the player's feet
    pub player_chunk: Point3<i32>,
    /// Chunks in the registry
    pub loaded_chunks: usize,
    /// Queued live blocks across all chunks
    pub active_blocks: usize,
    /// Chunk lookups answered by the cache
    pub cache_hits: u64,
    /// Chunk lookups that went to the index
    pub cache_misses: u64,
}

impl WorldStats {
    /// Share of chunk lookups answered by the cache, in percent.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 * 100.0 / total as f64
        }
    }
}

impl fmt::Display for WorldStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.player_position;
        write!(
            f,
            "pos ({:.2}, {:.2}, {:.2}) block ({}, {}, {}) chunk ({}, {}, {}) chunks {} active blocks {} hit ratio {:.0}%",
            p.x,
            p.y,
            p.z,
            self.player_block.x,
            self.player_block.y,
            self.player_block.z,
            self.player_chunk.x,
            self.player_chunk.y,
            self.player_chunk.z,
            self.loaded_chunks,
            self.active_blocks,
            self.hit_ratio()
        )
    }
}

/// The main state container for the voxel engine
///
/// This struct owns the world, the systems that change it and the draw list, and runs
/// them in order every tick. It has no window or GPU knowledge: geometry leaves through
/// the [`SurfaceFactory`] it is given.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::{
///     config::EngineConfig, player::PlayerInput, rendering::surface::HeadlessSurfaceFactory,
///     EngineState,
/// };
///
/// let mut engine = EngineState::new(EngineConfig::default(), Box::new(HeadlessSurfaceFactory::new()));
///
/// // Main game loop
/// for _ in 0..3 {
///     engine.tick(1.0 / 60.0, &PlayerInput::default());
///     engine.render();
/// }
/// assert!(engine.world.len() >= 27);
/// ```
pub struct EngineState {
    /// The chunk registry
    pub world: World,
    /// Terrain generator for new chunks
    pub generator: TerrainGenerator,
    /// Block rules applied to live blocks
    pub automaton: BlockAutomaton,
    /// Models submitted by `render`
    pub draw_list: DrawList,
    /// The player whose position drives streaming
    pub player: Player,
    /// Creates drawable surfaces for chunk models
    surfaces: Box<dyn SurfaceFactory>,
    config: EngineConfig,
    tick_count: u64,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized
    ///
    /// The chunks within the inner streaming radius of the spawn point are generated
    /// immediately so that the player starts above loaded ground.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration, already validated
    /// * `surfaces` - Factory for the drawable surfaces of chunk models
    ///
    /// # Returns
    ///
    /// A fully initialized `EngineState` instance
    pub fn new(config: EngineConfig, surfaces: Box<dyn SurfaceFactory>) -> Self {
        let mut generator = TerrainGenerator::new(config.seed, config.terrain.clone());
        let mut world = World::new(&config.streaming);

        let spawn_height = generator.surface_height(0, 0).max(generator.config().water_level) + 2;
        let spawn = Point3::new(0.5, spawn_height as f32, 0.5);
        let inner_radius = config.streaming.inner_radius;
        world.stream_near(spawn, inner_radius, inner_radius, &mut generator);
        info!(
            "Engine initialized with seed {} at {:?}, {} chunks loaded",
            config.seed,
            spawn,
            world.len()
        );

        Self {
            world,
            generator,
            automaton: BlockAutomaton::new(config.automaton.clone()),
            draw_list: DrawList::new(),
            player: Player::new(spawn),
            surfaces,
            config,
            tick_count: 0,
        }
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advances the engine by one tick
    ///
    /// # Arguments
    ///
    /// * `dt` - Seconds since the last tick
    /// * `input` - Player movement and actions for this tick
    pub fn tick(&mut self, dt: f32, input: &PlayerInput) -> TickReport {
        self.player.step(dt, input, &self.world);
        if input.dig {
            if let Some(dug) = self.dig(self.player.eye_position(), self.player.view_direction()) {
                debug!("Dug block at {:?}", dug);
            }
        }

        let streaming = &self.config.streaming;
        let center = self.player.position;
        let generated = self
            .world
            .stream_near(center, streaming.inner_radius, streaming.load_radius, &mut self.generator)
            .len();

        let evicted_chunks = self.world.evict_far(center, streaming.evict_distance);
        for chunk in &evicted_chunks {
            self.draw_list.remove_chunk(chunk.position);
        }
        let evicted = evicted_chunks.len();
        drop(evicted_chunks);

        let rebuilt = self.rebuild_dirty();
        let block_updates = self.automaton.tick(&mut self.world);

        self.tick_count += 1;
        if self.tick_count % STATS_INTERVAL == 0 {
            info!("{}", self.stats());
        }

        TickReport {
            generated,
            evicted,
            rebuilt,
            block_updates,
        }
    }

    /// Re-meshes dirty chunks in slot order.
    ///
    /// Stops once `max_nonempty_rebuilds_per_tick` rebuilds produced geometry. A chunk
    /// joins the draw list after its first rebuild.
    fn rebuild_dirty(&mut self) -> usize {
        let budget = self.config.meshing.max_nonempty_rebuilds_per_tick.max(1);
        let start = Instant::now();
        let mut rebuilt = 0;
        let mut nonempty = 0;

        for grid in self.world.grids() {
            if !self.world.lookup(grid).map_or(false, |chunk| chunk.is_dirty) {
                continue;
            }
            let Some(has_geometry) = self.world.rebuild_model(grid, self.surfaces.as_ref()) else {
                continue;
            };
            rebuilt += 1;

            if let Some(chunk) = self.world.lookup_mut(grid) {
                if chunk.is_new {
                    chunk.is_new = false;
                    self.draw_list.insert_chunk(grid);
                }
            }

            if has_geometry {
                nonempty += 1;
                if nonempty >= budget {
                    break;
                }
            }
        }

        if rebuilt > 0 {
            debug!(
                "Rebuilt {} chunk models ({} non-empty) in {:?}",
                rebuilt,
                nonempty,
                start.elapsed()
            );
        }
        rebuilt
    }

    /// Draws the listed chunk models
    ///
    /// # Returns
    ///
    /// The number of non-empty models drawn
    pub fn render(&self) -> usize {
        self.draw_list.draw(&self.world)
    }

    /// Removes the first block hit by a short ray.
    ///
    /// The ray advances in fixed steps from `origin` along `direction`, skipping air and
    /// unloaded space. The removed block and its 26 neighbors are queued as live blocks
    /// so that water next to the hole flows in.
    ///
    /// # Returns
    /// The world position of the removed block, if the ray hit one.
    pub fn dig(&mut self, origin: Point3<f32>, direction: Vector3<f32>) -> Option<Point3<i32>> {
        if direction.magnitude2() == 0.0 {
            return None;
        }
        let step = direction.normalize_to(DIG_STEP_LENGTH);

        let mut point = origin;
        for _ in 0..DIG_STEPS {
            point += step;
            let block = block_of_point(point);
            match self.world.loaded_block_at(block) {
                Some(block_type) if !block_type.is_air() => {
                    self.world.set_block_at(block, BlockType::AIR);
                    for x in -1..=1 {
                        for y in -1..=1 {
                            for z in -1..=1 {
                                self.world
                                    .push_live_block(block + Vector3::new(x, y, z), DIG_WAKE_POWER);
                            }
                        }
                    }
                    return Some(block);
                }
                _ => {}
            }
        }
        None
    }

    /// A snapshot of the player and registry counters.
    pub fn stats(&self) -> WorldStats {
        let position = self.player.position;
        WorldStats {
            player_position: position,
            player_block: block_of_point(position),
            player_chunk: chunk_of_point(position),
            loaded_chunks: self.world.len(),
            active_blocks: self.world.active_block_count(),
            cache_hits: self.world.cache_hits(),
            cache_misses: self.world.cache_misses(),
        }
    }
}
