//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air blocks of a chunk, in storage order
//! (x fastest, then z, then y).

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, Block};

use super::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

/// An iterator over all non-air blocks in a chunk.
///
/// Yields the chunk-local position and type of every block that is not `AIR`. A chunk
/// without storage yields nothing.
pub struct ChunkBlockIterator<'a> {
    /// The chunk's block storage, if allocated
    blocks: Option<&'a [Block]>,
    /// Index of the next cell to examine
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    ///
    /// # Arguments
    /// * `chunk_ref` - A reference to the chunk to iterate over
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            blocks: chunk_ref.raw_blocks(),
            current_offset: 0,
        }
    }

    /// Converts a storage offset back to a local position.
    fn position_of(offset: usize) -> Point3<i32> {
        let offset = offset as i32;
        Point3::new(
            offset % CHUNK_DIMENSION,
            offset / CHUNK_PLANE_SIZE,
            (offset / CHUNK_DIMENSION) % CHUNK_DIMENSION,
        )
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.blocks?;
        while self.current_offset < blocks.len() {
            let offset = self.current_offset;
            self.current_offset += 1;
            // Compare the raw id first; most cells are air.
            if blocks[offset].block_type != BlockType::AIR.id() {
                return Some((Self::position_of(offset), blocks[offset].get_block_type()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_only_non_air_blocks_with_their_positions() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(1, 2, 3, BlockType::STONE);
        chunk.set_block_at(31, 31, 31, BlockType::WATER);
        chunk.set_block_at(0, 0, 0, BlockType::SAND);

        let blocks: Vec<_> = chunk.iter_blocks().collect();
        assert_eq!(
            blocks,
            vec![
                (Point3::new(0, 0, 0), BlockType::SAND),
                (Point3::new(1, 2, 3), BlockType::STONE),
                (Point3::new(31, 31, 31), BlockType::WATER),
            ]
        );
    }

    #[test]
    fn unallocated_chunks_are_empty() {
        assert_eq!(Chunk::new(Point3::new(0, 0, 0)).iter_blocks().count(), 0);
    }
}
