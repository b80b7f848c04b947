//! # World Module
//!
//! This module provides the `World` struct, the chunk registry. It is the only owner of
//! loaded chunks and coordinates chunk lookup, streaming and eviction.
//!
//! ## Lookup
//!
//! Chunks live in a dense `Vec` and a hash map from grid coordinates to slot indices.
//! In front of the map sits a tiny LRU cache (one entry by default): neighbor lookups
//! usually hit the same chunk many times in a row, so the last answer is usually the
//! next answer. The cache is invalidated whenever the chunk it points to is removed or
//! moves to a different slot.
//!
//! ## Streaming
//!
//! [`World::stream_near`] creates the missing chunks around a point: every chunk in the
//! inner radius immediately, and the rest of the load radius nearest-first under a
//! per-call budget. [`World::evict_far`] removes chunks whose center drifted past the
//! eviction distance and hands them back so that callers can drop their references
//! before the chunk (and its models) is destroyed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::num::NonZeroUsize;

use cgmath::{MetricSpace, Point3, Vector3};
use log::{debug, trace};
use lru::LruCache;
use serde::{Deserialize, Serialize};

use super::block::{block_side::BlockSide, block_type::BlockType};
use super::chunk::{Chunk, CHUNK_DIMENSION};
use super::terrain::TerrainGenerator;
use crate::engine_state::rendering::surface::SurfaceFactory;

/// Read access to loaded chunks by grid coordinate.
///
/// Meshing and lighting use this to look across chunk borders. Besides [`World`], the
/// [`Unloaded`] source treats every other chunk as missing, which is how a chunk is
/// meshed in isolation.
pub trait ChunkSource {
    /// The loaded chunk at the grid coordinate, if any.
    fn chunk_at(&self, grid: Point3<i32>) -> Option<&Chunk>;

    /// The block at a world position. Unloaded space reads as `AIR`.
    fn block_at(&self, world: Point3<i32>) -> BlockType {
        let (grid, local) = world_to_chunk(world);
        self.chunk_at(grid)
            .map_or(BlockType::AIR, |chunk| chunk.get_block_at(local.x, local.y, local.z))
    }
}

/// A chunk source with nothing loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unloaded;

impl ChunkSource for Unloaded {
    fn chunk_at(&self, _grid: Point3<i32>) -> Option<&Chunk> {
        None
    }
}

/// Splits a world block position into a grid coordinate and a chunk-local position.
///
/// Uses floor division, so `-1` lands in chunk `-1` at local `31`.
pub fn world_to_chunk(world: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
    (
        Point3::new(
            world.x.div_euclid(CHUNK_DIMENSION),
            world.y.div_euclid(CHUNK_DIMENSION),
            world.z.div_euclid(CHUNK_DIMENSION),
        ),
        Point3::new(
            world.x.rem_euclid(CHUNK_DIMENSION),
            world.y.rem_euclid(CHUNK_DIMENSION),
            world.z.rem_euclid(CHUNK_DIMENSION),
        ),
    )
}

/// The block containing a world-space point.
pub fn block_of_point(point: Point3<f32>) -> Point3<i32> {
    Point3::new(
        point.x.floor() as i32,
        point.y.floor() as i32,
        point.z.floor() as i32,
    )
}

/// The grid coordinate of the chunk containing a world-space point.
pub fn chunk_of_point(point: Point3<f32>) -> Point3<i32> {
    world_to_chunk(block_of_point(point)).0
}

/// Streaming radii and budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunks within this Chebyshev distance of the center chunk are created at once.
    pub inner_radius: i32,
    /// Chunks within this Chebyshev distance are created over time.
    pub load_radius: i32,
    /// Outer chunks created per `stream_near` call.
    pub max_new_chunks_per_tick: usize,
    /// Chunks whose center is farther than this from the player are evicted.
    pub evict_distance: f32,
    /// Entries in the lookup cache.
    pub lookup_cache_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            inner_radius: 1,
            load_radius: 3,
            max_new_chunks_per_tick: 4,
            evict_distance: 250.0,
            lookup_cache_capacity: 1,
        }
    }
}

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::engine_state::voxels::{
///     block::block_type::BlockType,
///     chunk::Chunk,
///     world::{ChunkSource, World},
/// };
///
/// let mut world = World::default();
/// world.insert(Chunk::empty(Point3::new(-1, 0, 0)));
///
/// assert!(world.set_block_at(Point3::new(-1, 4, 2), BlockType::STONE));
/// assert_eq!(world.block_at(Point3::new(-1, 4, 2)), BlockType::STONE);
/// assert_eq!(world.lookup(Point3::new(-1, 0, 0)).map(|c| c.get_block_at(31, 4, 2)), Some(BlockType::STONE));
/// ```
pub struct World {
    /// Loaded chunks, in insertion order modulo swap-removal.
    chunks: Vec<Chunk>,
    /// Grid coordinate to index into `chunks`.
    index: HashMap<Point3<i32>, usize>,
    /// Recently looked up grid coordinates and their slots.
    lookup_cache: RefCell<LruCache<Point3<i32>, usize>>,
    cache_hits: Cell<u64>,
    cache_misses: Cell<u64>,
    max_new_chunks_per_tick: usize,
}

impl Default for World {
    fn default() -> Self {
        World::new(&StreamingConfig::default())
    }
}

impl World {
    /// Creates a new, empty world.
    pub fn new(config: &StreamingConfig) -> Self {
        let capacity = NonZeroUsize::new(config.lookup_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        World {
            chunks: Vec::new(),
            index: HashMap::new(),
            lookup_cache: RefCell::new(LruCache::new(capacity)),
            cache_hits: Cell::new(0),
            cache_misses: Cell::new(0),
            max_new_chunks_per_tick: config.max_new_chunks_per_tick,
        }
    }

    fn slot_of(&self, grid: Point3<i32>) -> Option<usize> {
        let mut cache = self.lookup_cache.borrow_mut();
        if let Some(slot) = cache.get(&grid) {
            self.cache_hits.set(self.cache_hits.get() + 1);
            return Some(*slot);
        }
        self.cache_misses.set(self.cache_misses.get() + 1);
        let slot = *self.index.get(&grid)?;
        cache.put(grid, slot);
        Some(slot)
    }

    /// Retrieves the chunk at the specified grid coordinates.
    pub fn lookup(&self, grid: Point3<i32>) -> Option<&Chunk> {
        self.slot_of(grid).map(|slot| &self.chunks[slot])
    }

    /// Retrieves the chunk at the specified grid coordinates for modification.
    pub fn lookup_mut(&mut self, grid: Point3<i32>) -> Option<&mut Chunk> {
        let slot = self.slot_of(grid)?;
        Some(&mut self.chunks[slot])
    }

    /// Registers a chunk.
    ///
    /// Loaded face neighbors are marked dirty, since their border faces were built
    /// against missing space.
    ///
    /// # Returns
    /// `false`, dropping `chunk`, if its grid cell is already occupied.
    pub fn insert(&mut self, chunk: Chunk) -> bool {
        let grid = chunk.position;
        if self.index.contains_key(&grid) {
            return false;
        }
        self.index.insert(grid, self.chunks.len());
        self.chunks.push(chunk);

        for side in BlockSide::all() {
            if let Some(slot) = self.index.get(&(grid + side.offset())) {
                self.chunks[*slot].is_dirty = true;
            }
        }
        true
    }

    /// Unregisters a chunk and returns it.
    ///
    /// Loaded face neighbors are marked dirty, since their border faces were culled
    /// against the removed chunk.
    pub fn remove(&mut self, grid: Point3<i32>) -> Option<Chunk> {
        let slot = self.index.remove(&grid)?;
        let cache = self.lookup_cache.get_mut();
        cache.pop(&grid);

        let chunk = self.chunks.swap_remove(slot);
        if let Some(moved) = self.chunks.get(slot) {
            self.index.insert(moved.position, slot);
            cache.pop(&moved.position);
        }

        for side in BlockSide::all() {
            if let Some(neighbor) = self.index.get(&(grid + side.offset())) {
                self.chunks[*neighbor].is_dirty = true;
            }
        }
        Some(chunk)
    }

    /// Creates and generates missing chunks around `center`.
    ///
    /// Every missing chunk within `inner_radius` of the center chunk is created. Missing
    /// chunks farther out, up to `load_radius`, are created nearest-first, at most
    /// `max_new_chunks_per_tick` per call. Both radii are Chebyshev distances in chunks.
    ///
    /// # Returns
    /// The grid coordinates of the chunks created.
    pub fn stream_near(
        &mut self,
        center: Point3<f32>,
        inner_radius: i32,
        load_radius: i32,
        generator: &mut TerrainGenerator,
    ) -> Vec<Point3<i32>> {
        let center_chunk = chunk_of_point(center);
        let load_radius = load_radius.max(inner_radius);

        let mut inner = Vec::new();
        let mut outer = Vec::new();
        for y in -load_radius..=load_radius {
            for z in -load_radius..=load_radius {
                for x in -load_radius..=load_radius {
                    let grid = center_chunk + Vector3::new(x, y, z);
                    if self.index.contains_key(&grid) {
                        continue;
                    }
                    if x.abs().max(y.abs()).max(z.abs()) <= inner_radius {
                        inner.push(grid);
                    } else {
                        outer.push((x * x + y * y + z * z, grid));
                    }
                }
            }
        }
        outer.sort_by_key(|(distance, _)| *distance);

        let created: Vec<Point3<i32>> = inner
            .into_iter()
            .chain(
                outer
                    .into_iter()
                    .take(self.max_new_chunks_per_tick)
                    .map(|(_, grid)| grid),
            )
            .collect();

        for grid in &created {
            let mut chunk = Chunk::new(*grid);
            chunk.generate_blocks(generator);
            trace!("Generated chunk {:?} with {} live blocks", grid, chunk.live_blocks().len());
            self.insert(chunk);
        }

        if !created.is_empty() {
            debug!("Streamed in {} chunks around {:?}", created.len(), center_chunk);
        }
        created
    }

    /// Removes every chunk whose center is farther than `max_distance` from `center`.
    ///
    /// # Returns
    /// The removed chunks. They are destroyed when the caller drops them.
    pub fn evict_far(&mut self, center: Point3<f32>, max_distance: f32) -> Vec<Chunk> {
        let far: Vec<Point3<i32>> = self
            .chunks
            .iter()
            .filter(|chunk| chunk.center().distance(center) > max_distance)
            .map(|chunk| chunk.position)
            .collect();

        let evicted: Vec<Chunk> = far.into_iter().filter_map(|grid| self.remove(grid)).collect();
        if !evicted.is_empty() {
            debug!("Evicted {} chunks", evicted.len());
        }
        evicted
    }

    /// The block at a world position, or `None` if its chunk is not loaded.
    pub fn loaded_block_at(&self, world: Point3<i32>) -> Option<BlockType> {
        let (grid, local) = world_to_chunk(world);
        self.lookup(grid)
            .map(|chunk| chunk.get_block_at(local.x, local.y, local.z))
    }

    /// Sets the block at a world position.
    ///
    /// Marks the owning chunk dirty, plus every loaded neighbor chunk sharing a face the
    /// block lies on.
    ///
    /// # Returns
    /// `true` if the block changed; `false` if it already had that type or its chunk is
    /// not loaded.
    pub fn set_block_at(&mut self, world: Point3<i32>, block_type: BlockType) -> bool {
        let (grid, local) = world_to_chunk(world);
        let sides = match self.lookup_mut(grid) {
            Some(chunk) => chunk.set_block_at(local.x, local.y, local.z, block_type),
            None => return false,
        };
        let Some(sides) = sides else {
            return false;
        };
        for side in sides {
            if let Some(neighbor) = self.lookup_mut(grid + side.offset()) {
                neighbor.is_dirty = true;
            }
        }
        true
    }

    /// Queues an automaton work item at a world position in the chunk that owns it.
    ///
    /// # Returns
    /// `false` if that chunk is not loaded.
    pub fn push_live_block(&mut self, world: Point3<i32>, power: i32) -> bool {
        let (grid, local) = world_to_chunk(world);
        match self.lookup_mut(grid) {
            Some(chunk) => {
                chunk.push_live_block(local, power);
                true
            }
            None => false,
        }
    }

    /// Rebuilds the models of one chunk against its loaded neighbors.
    ///
    /// # Returns
    /// `None` if the chunk is not loaded, otherwise whether it produced any geometry.
    pub fn rebuild_model(&mut self, grid: Point3<i32>, factory: &dyn SurfaceFactory) -> Option<bool> {
        let meshes = self.lookup(grid)?.build_meshes(self);
        Some(self.lookup_mut(grid)?.upload_model(meshes, factory))
    }

    /// Grid coordinates of every loaded chunk, in slot order.
    pub fn grids(&self) -> Vec<Point3<i32>> {
        self.chunks.iter().map(|chunk| chunk.position).collect()
    }

    /// Iterates over the loaded chunks in slot order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total queued automaton work items.
    pub fn active_block_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.live_blocks().len()).sum()
    }

    /// Lookups answered by the cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.get()
    }

    /// Lookups that went to the index.
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.get()
    }
}

impl ChunkSource for World {
    fn chunk_at(&self, grid: Point3<i32>) -> Option<&Chunk> {
        self.lookup(grid)
    }
}
