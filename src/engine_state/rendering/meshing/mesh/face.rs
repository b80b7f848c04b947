use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Width and height of one atlas tile in texture coordinates.
const TILE: f32 = 1.0 / 16.0;

/// One corner of a unit face, relative to the block's minimum corner.
///
/// `corner` components are 0 or 1. The y component is scaled by the face height, so a
/// lowered water surface moves the upper corners down.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FaceCorner {
    corner: [i32; 3],
    uv: [f32; 2],
}

const fn corner(x: i32, y: i32, z: i32, u: f32, v: f32) -> FaceCorner {
    FaceCorner {
        corner: [x, y, z],
        uv: [u * TILE, v * TILE],
    }
}

/// Corners of each face in `BlockSide` order, wound so that `0,1,2,2,3,0` covers the quad.
const FACE_CORNERS: [[FaceCorner; 4]; 6] = [
    // FRONT (+z)
    [
        corner(0, 0, 1, 0.0, 0.0),
        corner(1, 0, 1, 1.0, 0.0),
        corner(1, 1, 1, 1.0, 1.0),
        corner(0, 1, 1, 0.0, 1.0),
    ],
    // BACK (-z)
    [
        corner(0, 1, 0, 0.0, 1.0),
        corner(1, 1, 0, 1.0, 1.0),
        corner(1, 0, 0, 1.0, 0.0),
        corner(0, 0, 0, 0.0, 0.0),
    ],
    // BOTTOM (-y)
    [
        corner(1, 0, 0, 1.0, 0.0),
        corner(1, 0, 1, 1.0, 1.0),
        corner(0, 0, 1, 0.0, 1.0),
        corner(0, 0, 0, 0.0, 0.0),
    ],
    // TOP (+y)
    [
        corner(0, 1, 0, 0.0, 0.0),
        corner(0, 1, 1, 0.0, 1.0),
        corner(1, 1, 1, 1.0, 1.0),
        corner(1, 1, 0, 1.0, 0.0),
    ],
    // LEFT (-x)
    [
        corner(0, 0, 1, 0.0, 0.0),
        corner(0, 1, 1, 0.0, 1.0),
        corner(0, 1, 0, 1.0, 1.0),
        corner(0, 0, 0, 1.0, 0.0),
    ],
    // RIGHT (+x)
    [
        corner(1, 0, 0, 0.0, 0.0),
        corner(1, 1, 0, 0.0, 1.0),
        corner(1, 1, 1, 1.0, 1.0),
        corner(1, 0, 1, 1.0, 0.0),
    ],
];

/// Represents a single quad face of a voxel in the mesh.
///
/// A face knows where its four corners are, which part of the atlas tile each corner
/// maps to, and which 2x2x2 cell cube should be sampled to light each corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Chunk-local position of the block that owns the face
    pub position: Point3<i32>,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
    /// Height of the block, 1.0 for full blocks
    pub height: f32,
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// # Arguments
    /// * `position` - The coordinates of the voxel in chunk space
    /// * `block_side` - Which side of the block this face represents
    /// * `height` - The height of the block, used for lowered water surfaces
    pub fn new(position: Point3<i32>, block_side: BlockSide, height: f32) -> Self {
        Face {
            position,
            block_side,
            height,
        }
    }

    fn corners(&self) -> &'static [FaceCorner; 4] {
        &FACE_CORNERS[self.block_side as usize]
    }

    /// Positions of the four corners in chunk space.
    pub fn positions(&self) -> [[f32; 3]; 4] {
        self.corners().map(|c| {
            [
                (self.position.x + c.corner[0]) as f32,
                self.position.y as f32 + c.corner[1] as f32 * self.height,
                (self.position.z + c.corner[2]) as f32,
            ]
        })
    }

    /// Texture coordinates of the four corners, given the tile's top-left coordinate.
    pub fn tex_coords(&self, tile_uv: [f32; 2]) -> [[f32; 2]; 4] {
        self.corners()
            .map(|c| [tile_uv[0] + c.uv[0], tile_uv[1] + c.uv[1]])
    }

    /// Minimum corners of the 2x2x2 cell cubes sampled to light each corner.
    ///
    /// The cube straddles the vertex on the two axes in the plane of the face and lies
    /// entirely in front of the face along its normal.
    pub fn light_origins(&self) -> [Point3<i32>; 4] {
        let normal = self.block_side.offset();
        self.corners().map(|c| {
            let vertex = self.position + Vector3::new(c.corner[0], c.corner[1], c.corner[2]);
            let shift = |n: i32| match n {
                1 => 0,
                -1 => -2,
                _ => -1,
            };
            vertex + Vector3::new(shift(normal.x), shift(normal.y), shift(normal.z))
        })
    }
}
