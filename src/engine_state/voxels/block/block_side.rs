//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block, together with the
//! axis offsets used for neighbor lookups and the normals written into the mesh.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so it can index per-face tables.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The four sides lying in the horizontal plane, used by spreading blocks.
    pub fn horizontal() -> [BlockSide; 4] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The integer step from a block to its neighbor across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The outward unit normal of this face.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// Returns the chunk faces that a chunk-local position lies on.
    ///
    /// A block in a corner lies on three faces, a block on an edge on two, and an
    /// interior block on none. Changing a block on a face can change the mesh of the
    /// chunk on the other side of that face.
    ///
    /// # Arguments
    /// * `local` - A position inside the chunk, each axis in `0..CHUNK_DIMENSION`
    pub fn boundary_sides(local: Point3<i32>) -> Vec<BlockSide> {
        let last = CHUNK_DIMENSION - 1;
        let mut sides = Vec::new();
        if local.x == 0 {
            sides.push(BlockSide::LEFT);
        }
        if local.y == 0 {
            sides.push(BlockSide::BOTTOM);
        }
        if local.z == 0 {
            sides.push(BlockSide::BACK);
        }
        if local.x == last {
            sides.push(BlockSide::RIGHT);
        }
        if local.y == last {
            sides.push(BlockSide::TOP);
        }
        if local.z == last {
            sides.push(BlockSide::FRONT);
        }
        sides
    }
}
