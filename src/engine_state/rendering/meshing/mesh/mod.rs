//! Mesh generation for voxel rendering.
//!
//! This module converts chunk voxel data into GPU-friendly vertex and index buffers.
//!
//! # Architecture
//! - [`ChunkMeshes`]: the opaque and water meshes of one chunk, and the extraction pass
//!   that builds them
//! - [`MeshBuffers`]: vertices and indices for one material
//! - [`Face`]: corner positions, texture coordinates and light sample origins of one
//!   block face
//!
//! # Usage
//! ```
//! use cgmath::Point3;
//! use voxel_world::engine_state::rendering::meshing::ChunkMeshes;
//! use voxel_world::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk, world::Unloaded};
//!
//! let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
//! chunk.set_block_at(1, 1, 1, BlockType::STONE);
//! let meshes = ChunkMeshes::build(&chunk, &Unloaded);
//! assert_eq!(meshes.opaque.quad_count(), 6);
//! ```

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
