//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 32x32x32 cube of blocks together with its
//! automaton work list and its two render models.
//!
//! ## Storage
//!
//! Blocks are stored densely, one byte each, indexed `y * 1024 + z * 32 + x`. The array
//! is allocated lazily, the first time the chunk is generated or written to; until then
//! every block reads as air.
//!
//! ## Lifecycle
//!
//! ```text
//! no blocks ──generate_blocks──▶ dirty ──upload_model──▶ clean
//!                                  ▲                       │
//!                                  └──── any mutation ─────┘
//! ```
//!
//! `is_new` starts out `true` and is cleared by the engine the first time the chunk's
//! models enter the draw list.
//!
//! ## Borders
//!
//! Local coordinates outside `0..CHUNK_DIMENSION` never index the array. Plain accessors
//! answer `AIR` for them; the neighbor-aware accessors resolve them through a
//! [`ChunkSource`] so that meshing and lighting see across chunk borders.

use cgmath::{EuclideanSpace, Point3, Vector3};

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::block::Block;
use super::terrain::TerrainGenerator;
use super::world::{world_to_chunk, ChunkSource};
use crate::engine_state::rendering::meshing::ChunkMeshes;
use crate::engine_state::rendering::model::{ChunkModel, MaterialKind};
use crate::engine_state::rendering::surface::SurfaceFactory;

pub mod chunk_iteration;

use chunk_iteration::ChunkBlockIterator;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 32;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// An automaton work item: a block position plus the fuel left for its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicBlock {
    /// Chunk-local position
    pub position: Point3<i32>,
    /// Remaining growth, spread or flow power
    pub power: i32,
}

/// Represents a 32x32x32 collection of voxel blocks in the world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,
    /// Set when the models no longer match the blocks.
    pub is_dirty: bool,
    /// Set until the chunk's models are first added to the draw list.
    pub is_new: bool,
    blocks: Option<Box<[Block]>>,
    live_blocks: Vec<DynamicBlock>,
    model: Option<ChunkModel>,
    water_model: Option<ChunkModel>,
}

/// Index of a local coordinate, or `None` when it lies outside the chunk.
#[inline]
fn block_index(x: i32, y: i32, z: i32) -> Option<usize> {
    let range = 0..CHUNK_DIMENSION;
    if range.contains(&x) && range.contains(&y) && range.contains(&z) {
        Some((y * CHUNK_PLANE_SIZE + z * CHUNK_DIMENSION + x) as usize)
    } else {
        None
    }
}

impl Chunk {
    /// Creates a chunk without block storage. Every block reads as air.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn new(position: Point3<i32>) -> Self {
        Chunk {
            position,
            is_dirty: false,
            is_new: true,
            blocks: None,
            live_blocks: Vec::new(),
            model: None,
            water_model: None,
        }
    }

    /// Creates a chunk with allocated storage filled with air.
    pub fn empty(position: Point3<i32>) -> Self {
        Self::solid(position, BlockType::AIR)
    }

    /// Creates a chunk completely filled with one block type.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `block_type` - The block every cell is set to
    pub fn solid(position: Point3<i32>, block_type: BlockType) -> Self {
        let mut chunk = Chunk::new(position);
        chunk.blocks = Some(vec![Block::new(block_type); CHUNK_SIZE as usize].into_boxed_slice());
        chunk.is_dirty = true;
        chunk
    }

    /// Whether block storage has been allocated.
    pub fn has_blocks(&self) -> bool {
        self.blocks.is_some()
    }

    /// World position of the block at local (0, 0, 0).
    pub fn world_origin(&self) -> Point3<i32> {
        Point3::from_vec(self.position.to_vec() * CHUNK_DIMENSION)
    }

    /// World position of the chunk's geometric center.
    pub fn center(&self) -> Point3<f32> {
        let origin = self.world_origin().cast::<f32>().unwrap_or(Point3::origin());
        origin + Vector3::new(1.0, 1.0, 1.0) * (CHUNK_DIMENSION as f32 / 2.0)
    }

    /// Fills every cell from the terrain generator.
    ///
    /// Trunk blocks found in the terrain are queued as automaton work items with a
    /// power picked by the generator for that position. Any previously queued items are
    /// dropped, so generating twice from the same generator yields the same chunk.
    ///
    /// # Arguments
    /// * `generator` - The terrain generator; its footprint cache is moved to this chunk
    pub fn generate_blocks(&mut self, generator: &mut TerrainGenerator) {
        let origin = self.world_origin();
        generator.init(origin.x, origin.z);

        let blocks = self
            .blocks
            .get_or_insert_with(|| vec![Block::default(); CHUNK_SIZE as usize].into_boxed_slice());
        self.live_blocks.clear();

        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let world = origin + Vector3::new(x, y, z);
                    let block_type = generator.block_at(world.x, world.y, world.z);
                    if let Some(index) = block_index(x, y, z) {
                        blocks[index] = Block::new(block_type);
                    }
                    if block_type == BlockType::WOOD {
                        self.live_blocks.push(DynamicBlock {
                            position: Point3::new(x, y, z),
                            power: generator.tree_power_at(world),
                        });
                    }
                }
            }
        }

        self.is_dirty = true;
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Returns
    /// The block type, or `AIR` if the coordinates are out of bounds or the chunk has no
    /// storage yet.
    #[inline]
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        match (&self.blocks, block_index(x, y, z)) {
            (Some(blocks), Some(index)) => blocks[index].get_block_type(),
            _ => BlockType::AIR,
        }
    }

    /// Sets the block at the specified chunk-relative coordinates.
    ///
    /// Out-of-range coordinates and writes that do not change the block are ignored and
    /// leave the dirty flag alone. Otherwise the chunk is marked dirty.
    ///
    /// # Returns
    /// `None` if nothing changed, otherwise the chunk faces the block lies on. The chunks
    /// across those faces may need a rebuild as well; [`super::world::World::set_block_at`]
    /// takes care of marking them.
    pub fn set_block_at(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> Option<Vec<BlockSide>> {
        let index = block_index(x, y, z)?;
        if self.get_block_at(x, y, z) == block_type {
            return None;
        }
        let blocks = self
            .blocks
            .get_or_insert_with(|| vec![Block::default(); CHUNK_SIZE as usize].into_boxed_slice());
        blocks[index] = Block::new(block_type);
        self.is_dirty = true;
        Some(BlockSide::boundary_sides(Point3::new(x, y, z)))
    }

    /// Block at a local position that may lie outside this chunk.
    ///
    /// # Returns
    /// The block, or `None` if the position falls in a neighbor chunk that is not loaded.
    pub fn neighbor_block(&self, local: Point3<i32>, world: &dyn ChunkSource) -> Option<BlockType> {
        if block_index(local.x, local.y, local.z).is_some() {
            return Some(self.get_block_at(local.x, local.y, local.z));
        }
        let (grid, inner) = world_to_chunk(self.world_origin() + local.to_vec());
        world
            .chunk_at(grid)
            .map(|chunk| chunk.get_block_at(inner.x, inner.y, inner.z))
    }

    /// Like [`Chunk::neighbor_block`], with unloaded space reading as air.
    #[inline]
    pub fn sample_block(&self, local: Point3<i32>, world: &dyn ChunkSource) -> BlockType {
        self.neighbor_block(local, world).unwrap_or(BlockType::AIR)
    }

    /// Corner light sample.
    ///
    /// Counts the non-solid cells among the 2x2x2 cells whose minimum corner is `local`
    /// and returns the fraction as a gray RGBA color: 1.0 in open air, 0.0 when buried.
    pub fn calc_light(&self, local: Point3<i32>, world: &dyn ChunkSource) -> [f32; 4] {
        let mut open = 0;
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    if !self
                        .sample_block(local + Vector3::new(i, j, k), world)
                        .is_solid(false)
                    {
                        open += 1;
                    }
                }
            }
        }
        let light = open as f32 / 8.0;
        [light, light, light, 1.0]
    }

    /// Iterates over every non-air block with its local position.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    pub(crate) fn raw_blocks(&self) -> Option<&[Block]> {
        self.blocks.as_deref()
    }

    /// Builds the opaque and water meshes from the current blocks.
    pub fn build_meshes(&self, world: &dyn ChunkSource) -> ChunkMeshes {
        ChunkMeshes::build(self, world)
    }

    /// Uploads freshly built meshes into the chunk's models and clears the dirty flag.
    ///
    /// Models are created on first use.
    ///
    /// # Returns
    /// `true` if either mesh has geometry.
    pub fn upload_model(&mut self, meshes: ChunkMeshes, factory: &dyn SurfaceFactory) -> bool {
        let origin = self.world_origin().cast::<f32>().unwrap_or(Point3::origin());
        self.model
            .get_or_insert_with(|| ChunkModel::new(origin, MaterialKind::Opaque, factory))
            .upload(&meshes.opaque);
        self.water_model
            .get_or_insert_with(|| ChunkModel::new(origin, MaterialKind::Translucent, factory))
            .upload(&meshes.water);
        self.is_dirty = false;
        !meshes.is_empty()
    }

    /// Rebuilds both models from scratch.
    ///
    /// # Arguments
    /// * `world` - Neighbor lookup for border faces; pass
    ///   [`super::world::Unloaded`] for a chunk on its own
    /// * `factory` - Creates the drawable surfaces the first time
    ///
    /// # Returns
    /// `true` if the chunk produced any geometry.
    pub fn generate_model(&mut self, world: &dyn ChunkSource, factory: &dyn SurfaceFactory) -> bool {
        let meshes = self.build_meshes(world);
        self.upload_model(meshes, factory)
    }

    /// The model drawn in the given pass, once built.
    pub fn model(&self, material: MaterialKind) -> Option<&ChunkModel> {
        match material {
            MaterialKind::Opaque => self.model.as_ref(),
            MaterialKind::Translucent => self.water_model.as_ref(),
        }
    }

    /// Queues an automaton work item at a local position.
    pub fn push_live_block(&mut self, position: Point3<i32>, power: i32) {
        self.live_blocks.push(DynamicBlock { position, power });
    }

    /// The queued automaton work items, in no particular order.
    pub fn live_blocks(&self) -> &[DynamicBlock] {
        &self.live_blocks
    }

    /// Removes and returns a uniformly chosen work item.
    pub fn take_random_live_block(&mut self, rng: &mut fastrand::Rng) -> Option<DynamicBlock> {
        if self.live_blocks.is_empty() {
            return None;
        }
        let index = rng.usize(..self.live_blocks.len());
        Some(self.live_blocks.swap_remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::surface::HeadlessSurfaceFactory;
    use crate::engine_state::voxels::terrain::TerrainConfig;
    use crate::engine_state::voxels::world::Unloaded;

    #[test]
    fn out_of_range_reads_are_air() {
        let chunk = Chunk::solid(Point3::new(0, 0, 0), BlockType::STONE);
        assert_eq!(chunk.get_block_at(0, 0, 0), BlockType::STONE);
        for (x, y, z) in [(-1, 0, 0), (0, 32, 0), (0, 0, -5), (32, 32, 32), (i32::MIN, 0, i32::MAX)] {
            assert_eq!(chunk.get_block_at(x, y, z), BlockType::AIR);
        }
        assert_eq!(Chunk::new(Point3::new(3, 3, 3)).get_block_at(1, 1, 1), BlockType::AIR);
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.is_dirty = false;
        assert!(chunk.set_block_at(32, 0, 0, BlockType::STONE).is_none());
        assert!(chunk.set_block_at(0, -1, 0, BlockType::STONE).is_none());
        assert!(!chunk.is_dirty);
        assert_eq!(chunk.iter_blocks().count(), 0);
    }

    #[test]
    fn only_real_changes_mark_the_chunk_dirty() {
        let factory = HeadlessSurfaceFactory::new();
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.generate_model(&Unloaded, &factory);
        assert!(!chunk.is_dirty);

        assert!(chunk.set_block_at(3, 3, 3, BlockType::AIR).is_none());
        assert!(!chunk.is_dirty);

        assert_eq!(chunk.set_block_at(3, 3, 3, BlockType::DIRT), Some(Vec::new()));
        assert!(chunk.is_dirty);

        chunk.generate_model(&Unloaded, &factory);
        assert!(!chunk.is_dirty);
        assert!(chunk.set_block_at(3, 3, 3, BlockType::DIRT).is_none());
        assert!(!chunk.is_dirty);
    }

    #[test]
    fn border_writes_report_the_touched_faces() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        let sides = chunk.set_block_at(31, 5, 0, BlockType::SAND).unwrap();
        assert_eq!(sides, vec![BlockSide::BACK, BlockSide::RIGHT]);
        assert!(chunk.has_blocks());
    }

    #[test]
    fn calc_light_counts_open_corners() {
        let buried = Chunk::solid(Point3::new(0, 0, 0), BlockType::STONE);
        assert_eq!(buried.calc_light(Point3::new(4, 4, 4), &Unloaded), [0.0, 0.0, 0.0, 1.0]);

        let open = Chunk::empty(Point3::new(0, 0, 0));
        assert_eq!(open.calc_light(Point3::new(4, 4, 4), &Unloaded), [1.0, 1.0, 1.0, 1.0]);

        let mut half = Chunk::empty(Point3::new(0, 0, 0));
        for (x, z) in [(4, 4), (5, 4), (4, 5), (5, 5)] {
            half.set_block_at(x, 4, z, BlockType::STONE);
        }
        assert_eq!(half.calc_light(Point3::new(4, 4, 4), &Unloaded)[0], 0.5);

        // Water does not block light.
        let mut wet = Chunk::empty(Point3::new(0, 0, 0));
        wet.set_block_at(4, 4, 4, BlockType::WATER);
        assert_eq!(wet.calc_light(Point3::new(4, 4, 4), &Unloaded)[0], 1.0);
    }

    #[test]
    fn generation_queues_trunks_and_is_repeatable() {
        let config = TerrainConfig {
            tree_chance: 0.5,
            ..TerrainConfig::default()
        };
        let mut generator = TerrainGenerator::new(42, config);

        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.generate_blocks(&mut generator);
        assert!(chunk.is_dirty);
        assert!(chunk.has_blocks());

        for item in chunk.live_blocks() {
            let p = item.position;
            assert_eq!(chunk.get_block_at(p.x, p.y, p.z), BlockType::WOOD);
            assert!((7..=13).contains(&item.power));
        }

        let mut again = Chunk::new(Point3::new(0, 0, 0));
        again.generate_blocks(&mut generator);
        chunk.generate_blocks(&mut generator);
        assert_eq!(chunk.live_blocks(), again.live_blocks());
        assert!(chunk.raw_blocks() == again.raw_blocks());
    }

    #[test]
    fn random_live_blocks_are_removed() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.push_live_block(Point3::new(1, 1, 1), 3);
        chunk.push_live_block(Point3::new(2, 2, 2), 4);
        let mut rng = fastrand::Rng::with_seed(9);

        let first = chunk.take_random_live_block(&mut rng).unwrap();
        let second = chunk.take_random_live_block(&mut rng).unwrap();
        assert_ne!(first, second);
        assert!(chunk.take_random_live_block(&mut rng).is_none());
    }

    #[test]
    fn models_are_created_once_and_cleared_on_upload() {
        let factory = HeadlessSurfaceFactory::new();
        let stats = factory.stats();
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(0, 0, 0, BlockType::WATER);

        assert!(chunk.generate_model(&Unloaded, &factory));
        assert_eq!(stats.live_surfaces.get(), 2);
        assert_eq!(chunk.model(MaterialKind::Translucent).map(|m| m.index_count()), Some(36));
        assert!(chunk.model(MaterialKind::Opaque).map_or(false, |m| m.is_empty()));

        chunk.set_block_at(0, 0, 0, BlockType::AIR);
        assert!(!chunk.generate_model(&Unloaded, &factory));
        assert_eq!(stats.live_surfaces.get(), 2);

        drop(chunk);
        assert_eq!(stats.live_surfaces.get(), 0);
    }
}
