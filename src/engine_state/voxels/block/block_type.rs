//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! The numeric value of every variant doubles as its cell index in the 16x16 texture
//! atlas, so the values are part of the data format and must never be renumbered.

use log::warn;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// Each variant carries an explicit discriminant equal to its atlas cell
/// (`row * 16 + column`). The `FromPrimitive` derive allows conversion back from
/// the compact storage format.
#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Never rendered, never solid.
    AIR = 0,
    /// Bulk underground rock.
    STONE = 1,
    /// Subsoil and underwater surface.
    DIRT = 2,
    /// Surface block above the water line. Top and bottom faces use their own tiles.
    GRASS = 3,
    PLANKS = 4,
    STEPS = 5,
    CLAY = 6,
    BRICKS = 7,
    TNT = 8,
    COBBLE = 16,
    BEDROCK = 17,
    /// Beach block placed exactly at the water line.
    SAND = 18,
    GRAVEL = 19,
    /// Tree trunk. Grows upwards while it still has power.
    WOOD = 20,
    GOLD_ORE = 32,
    IRON_ORE = 33,
    COAL_ORE = 34,
    /// Tree canopy. Spreads sideways while it still has power.
    LEAVES = 53,
    /// Surface block above the snow line.
    SNOW = 66,
    /// Semi-solid liquid, meshed into the translucent buffer.
    WATER = 205,
}

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// Unknown ids are not propagated into rendering: they resolve to `STONE`,
    /// which is solid and has no special behavior.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `STONE` if `btype` is not a known id
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        BlockType::from_u8(btype).unwrap_or_else(|| {
            warn!("Unknown block id {}, treating it as stone", btype);
            BlockType::STONE
        })
    }

    /// The stable numeric id of this block type.
    #[inline]
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Returns `true` for `AIR`.
    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Returns `true` for `WATER`.
    #[inline]
    pub fn is_water(self) -> bool {
        self == BlockType::WATER
    }

    /// Whether this block hides the face of a neighbor.
    ///
    /// The answer depends on who is asking. From the point of view of water
    /// (`viewer_is_water == true`) every non-air block is solid, so only the
    /// water-to-air surface of a lake is kept and neighboring water cells share no
    /// faces. From the point of view of any other block, water is see-through, so
    /// the ground under a lake still gets its top face.
    #[inline]
    pub fn is_solid(self, viewer_is_water: bool) -> bool {
        if viewer_is_water {
            self != BlockType::AIR
        } else {
            self != BlockType::AIR && self != BlockType::WATER
        }
    }

    /// Whether the player collides with this block.
    #[inline]
    pub fn is_collidable(self) -> bool {
        self.is_solid(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable() {
        assert_eq!(BlockType::AIR.id(), 0);
        assert_eq!(BlockType::GRASS.id(), 3);
        assert_eq!(BlockType::WOOD.id(), 20);
        assert_eq!(BlockType::LEAVES.id(), 53);
        assert_eq!(BlockType::WATER.id(), 205);
    }

    #[test]
    fn round_trips_known_ids() {
        for block in [
            BlockType::AIR,
            BlockType::STONE,
            BlockType::SAND,
            BlockType::COAL_ORE,
            BlockType::SNOW,
            BlockType::WATER,
        ] {
            assert_eq!(BlockType::get_block_type_from_int(block.id()), block);
        }
    }

    #[test]
    fn unknown_ids_fall_back_to_stone() {
        assert_eq!(BlockType::get_block_type_from_int(9), BlockType::STONE);
        assert_eq!(BlockType::get_block_type_from_int(255), BlockType::STONE);
    }

    #[test]
    fn water_solidity_depends_on_the_viewer() {
        assert!(!BlockType::AIR.is_solid(true));
        assert!(!BlockType::AIR.is_solid(false));
        assert!(BlockType::STONE.is_solid(true));
        assert!(BlockType::STONE.is_solid(false));
        assert!(BlockType::WATER.is_solid(true));
        assert!(!BlockType::WATER.is_solid(false));
        assert!(!BlockType::WATER.is_collidable());
    }
}
