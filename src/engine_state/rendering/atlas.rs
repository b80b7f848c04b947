//! Texture atlas coordinates.
//!
//! The block atlas is a 16x16 grid of square tiles. A block type's id is its tile index,
//! counted row by row from the top-left tile, so most blocks need no table at all. Blocks
//! whose top or bottom face uses a different tile are listed in [`FACE_TILE_OVERRIDES`].

use phf::phf_map;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

/// Number of tiles along each edge of the atlas.
pub const ATLAS_TILES_PER_ROW: u8 = 16;

/// Width and height of one tile in normalized texture coordinates.
pub const ATLAS_TILE_SIZE: f32 = 1.0 / ATLAS_TILES_PER_ROW as f32;

/// Tiles used instead of the side tile on the horizontal faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceTiles {
    /// Tile for the top face
    pub top: u8,
    /// Tile for the bottom face
    pub bottom: u8,
}

/// Face tile overrides keyed by block id.
pub static FACE_TILE_OVERRIDES: phf::Map<u8, FaceTiles> = phf_map! {
    // GRASS: green top, dirt bottom.
    3u8 => FaceTiles { top: 0, bottom: 2 },
};

/// Top-left corner of an atlas tile.
///
/// Texture coordinates grow upwards, so row `r` starts at `1 - (r + 1) / 16`.
pub fn tile_uv(tile: u8) -> [f32; 2] {
    let column = (tile % ATLAS_TILES_PER_ROW) as f32;
    let row = (tile / ATLAS_TILES_PER_ROW) as f32;
    [column * ATLAS_TILE_SIZE, 1.0 - (row + 1.0) * ATLAS_TILE_SIZE]
}

/// The tile drawn on one face of a block.
pub fn face_tile(block: BlockType, side: BlockSide) -> u8 {
    match (FACE_TILE_OVERRIDES.get(&block.id()), side) {
        (Some(tiles), BlockSide::TOP) => tiles.top,
        (Some(tiles), BlockSide::BOTTOM) => tiles.bottom,
        _ => block.id(),
    }
}

/// Atlas coordinate of the tile drawn on one face of a block.
pub fn atlas_uv(block: BlockType, side: BlockSide) -> [f32; 2] {
    tile_uv(face_tile(block, side))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6
    }

    #[test]
    fn tiles_follow_block_ids() {
        assert!(close(atlas_uv(BlockType::STONE, BlockSide::FRONT), [1.0 / 16.0, 15.0 / 16.0]));
        // WOOD is id 20: second row, fifth column.
        assert!(close(atlas_uv(BlockType::WOOD, BlockSide::TOP), [4.0 / 16.0, 14.0 / 16.0]));
        // WATER is id 205: row 12, column 13.
        assert!(close(atlas_uv(BlockType::WATER, BlockSide::LEFT), [13.0 / 16.0, 3.0 / 16.0]));
    }

    #[test]
    fn grass_has_distinct_top_and_bottom() {
        let side = atlas_uv(BlockType::GRASS, BlockSide::RIGHT);
        let top = atlas_uv(BlockType::GRASS, BlockSide::TOP);
        let bottom = atlas_uv(BlockType::GRASS, BlockSide::BOTTOM);
        assert!(close(side, [3.0 / 16.0, 15.0 / 16.0]));
        assert!(close(top, [0.0, 15.0 / 16.0]));
        assert!(close(bottom, [2.0 / 16.0, 15.0 / 16.0]));
    }
}
