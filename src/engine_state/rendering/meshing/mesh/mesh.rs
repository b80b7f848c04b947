//! Mesh data structures and the chunk surface extraction pass.
//!
//! A chunk mesh is built from scratch every time the chunk is rebuilt. Every non-air block
//! contributes one quad per visible face; a face is visible when the cell in front of it
//! is not solid from the block's point of view (see [`BlockType::is_solid`]). Cells in a
//! neighbor chunk that is not loaded count as open, so chunk borders facing unloaded space
//! stay closed off visually until the neighbor arrives and triggers a rebuild.

use cgmath::{Point3, Vector3};
use log::trace;
use web_time::Instant;

use crate::engine_state::rendering::atlas::atlas_uv;
use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::Chunk,
    world::ChunkSource,
};

use super::face::Face;

/// Height of an exposed water surface, slightly below a full block.
pub const WATER_SURFACE_HEIGHT: f32 = 0.9;

/// Tint applied to every face of a leaves block.
pub const LEAVES_TINT: [f32; 4] = [0.0, 0.8, 0.0, 1.0];

/// How far above a top face the mesher looks for cover.
pub const CEILING_SCAN_DISTANCE: i32 = 16;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Vertex and index data for one material of a chunk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshBuffers {
    /// The vertex data, four vertices per quad
    pub vertices: Vec<Vertex>,
    /// The index data, six indices per quad
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no quad has been added.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The number of quads in the buffers.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Appends one quad and the two triangles covering it.
    pub fn push_quad(&mut self, vertices: [Vertex; 4]) {
        let indices = generate_face_indices(self.quad_count() as u32);
        self.vertices.extend_from_slice(&vertices);
        self.indices.extend_from_slice(&indices);
    }
}

/// Generates index data for a face, adjusted by the number of previously generated faces.
///
/// # Arguments
/// * `num_faces_generated` - The number of faces that have been generated so far
///
/// # Returns
/// Six indices forming the triangles `0,1,2` and `2,3,0` of the face's four vertices.
pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
    let base = num_faces_generated * 4;
    [base, base + 1, base + 2, base + 2, base + 3, base]
}

/// The two meshes of a chunk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChunkMeshes {
    /// Every non-water block
    pub opaque: MeshBuffers,
    /// Water blocks, drawn in the translucent pass
    pub water: MeshBuffers,
}

impl ChunkMeshes {
    /// Returns `true` if neither mesh has any geometry.
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.water.is_empty()
    }

    /// Builds both meshes of a chunk.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to mesh
    /// * `world` - Where neighbor chunks are looked up for faces and light samples on
    ///   the chunk border
    pub fn build(chunk: &Chunk, world: &dyn ChunkSource) -> Self {
        let start = Instant::now();
        let mut meshes = ChunkMeshes::default();

        for (position, block) in chunk.iter_blocks() {
            let is_water = block.is_water();
            let visible = BlockSide::all().map(|side| {
                chunk
                    .neighbor_block(position + side.offset(), world)
                    .map_or(true, |neighbor| !neighbor.is_solid(is_water))
            });
            if !visible.iter().any(|v| *v) {
                continue;
            }

            let height = if is_water && visible[BlockSide::TOP as usize] {
                WATER_SURFACE_HEIGHT
            } else {
                1.0
            };
            let tint = if block == BlockType::LEAVES { LEAVES_TINT } else { WHITE };
            let buffers = if is_water {
                &mut meshes.water
            } else {
                &mut meshes.opaque
            };

            for side in BlockSide::all() {
                if !visible[side as usize] {
                    continue;
                }
                let mut color = tint;
                if side == BlockSide::TOP {
                    let shade = ceiling_shade(chunk, position, world);
                    for channel in color.iter_mut().take(3) {
                        *channel *= shade;
                    }
                }
                buffers.push_quad(face_vertices(
                    chunk,
                    world,
                    Face::new(position, side, height),
                    block,
                    color,
                ));
            }
        }

        trace!(
            "Meshed chunk {:?}: {} opaque quads, {} water quads in {:?}",
            chunk.position,
            meshes.opaque.quad_count(),
            meshes.water.quad_count(),
            start.elapsed()
        );

        meshes
    }
}

/// Darkening factor for a top face from the first solid block above it.
///
/// A block directly above (`c == 1`) gives `0.5 + 1/32`; cover further away darkens less.
/// With no cover within [`CEILING_SCAN_DISTANCE`] the face keeps full brightness.
pub fn ceiling_shade(chunk: &Chunk, position: Point3<i32>, world: &dyn ChunkSource) -> f32 {
    (1..CEILING_SCAN_DISTANCE)
        .find(|c| {
            chunk
                .sample_block(position + Vector3::new(0, *c, 0), world)
                .is_solid(false)
        })
        .map_or(1.0, |c| 0.5 + c as f32 / 32.0)
}

fn face_vertices(
    chunk: &Chunk,
    world: &dyn ChunkSource,
    face: Face,
    block: BlockType,
    color: [f32; 4],
) -> [Vertex; 4] {
    let positions = face.positions();
    let tex_coords = face.tex_coords(atlas_uv(block, face.block_side));
    let light_origins = face.light_origins();
    let normal = face.block_side.normal();

    [0usize, 1, 2, 3].map(|i| {
        let light = chunk.calc_light(light_origins[i], world);
        let lit = [
            color[0] * light[0],
            color[1] * light[1],
            color[2] * light[2],
            color[3] * light[3],
        ];
        Vertex::new(positions[i], tex_coords[i], normal, lit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::world::{Unloaded, World};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn indices_cover_the_quad_twice() {
        assert_eq!(generate_face_indices(0), [0, 1, 2, 2, 3, 0]);
        assert_eq!(generate_face_indices(2), [8, 9, 10, 10, 11, 8]);
    }

    #[test]
    fn isolated_block_emits_six_faces() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(4, 4, 4, BlockType::STONE);
        let meshes = ChunkMeshes::build(&chunk, &Unloaded);

        assert_eq!(meshes.opaque.quad_count(), 6);
        assert_eq!(meshes.opaque.indices.len(), 36);
        assert!(meshes.water.is_empty());
        assert_eq!(meshes.opaque.indices[6..12], [4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn enclosed_water_only_shows_its_surface() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(5, 5, 5, BlockType::WATER);
        for side in [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ] {
            let p = Point3::new(5, 5, 5) + side.offset();
            chunk.set_block_at(p.x, p.y, p.z, BlockType::STONE);
        }

        let meshes = ChunkMeshes::build(&chunk, &Unloaded);
        assert_eq!(meshes.water.vertices.len(), 4);
        assert_eq!(meshes.water.indices.len(), 6);
        for vertex in &meshes.water.vertices {
            assert!(approx(vertex.position[1], 5.9));
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        }
        // The stone around the water sees through it, so the stone under it keeps its top.
        assert!(meshes.opaque.vertices.iter().any(|v| v.normal == [0.0, 1.0, 0.0]
            && approx(v.position[1], 5.0)
            && v.position[0] >= 5.0
            && v.position[0] <= 6.0
            && v.position[2] >= 5.0
            && v.position[2] <= 6.0));
    }

    #[test]
    fn neighboring_water_shares_no_faces() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(5, 5, 5, BlockType::WATER);
        chunk.set_block_at(6, 5, 5, BlockType::WATER);
        let meshes = ChunkMeshes::build(&chunk, &Unloaded);
        assert_eq!(meshes.water.quad_count(), 10);
    }

    #[test]
    fn border_faces_depend_on_the_neighbor_chunk() {
        let mut world = World::default();
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(31, 0, 0, BlockType::STONE);
        world.insert(chunk);

        let unloaded = ChunkMeshes::build(world.lookup(Point3::new(0, 0, 0)).unwrap(), &world);
        assert_eq!(unloaded.opaque.quad_count(), 6);

        world.insert(Chunk::solid(Point3::new(1, 0, 0), BlockType::STONE));
        let covered = ChunkMeshes::build(world.lookup(Point3::new(0, 0, 0)).unwrap(), &world);
        assert_eq!(covered.opaque.quad_count(), 5);
        assert!(covered
            .opaque
            .vertices
            .iter()
            .all(|v| v.normal != [1.0, 0.0, 0.0]));
    }

    #[test]
    fn top_faces_darken_under_cover() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(8, 2, 8, BlockType::DIRT);
        chunk.set_block_at(8, 5, 8, BlockType::DIRT);
        assert!(approx(ceiling_shade(&chunk, Point3::new(8, 2, 8), &Unloaded), 0.5 + 3.0 / 32.0));
        assert!(approx(ceiling_shade(&chunk, Point3::new(8, 5, 8), &Unloaded), 1.0));

        let meshes = ChunkMeshes::build(&chunk, &Unloaded);
        let covered_top = meshes
            .opaque
            .vertices
            .iter()
            .find(|v| v.normal == [0.0, 1.0, 0.0] && approx(v.position[1], 3.0))
            .unwrap();
        // Open air around the vertex, so only the ceiling factor applies.
        assert!(approx(covered_top.color[0], 0.5 + 3.0 / 32.0));
        assert!(approx(covered_top.color[3], 1.0));
    }

    #[test]
    fn leaves_are_tinted_and_grass_uses_its_top_tile() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set_block_at(3, 3, 3, BlockType::LEAVES);
        chunk.set_block_at(10, 3, 10, BlockType::GRASS);
        let meshes = ChunkMeshes::build(&chunk, &Unloaded);

        let leaves: Vec<&Vertex> = meshes
            .opaque
            .vertices
            .iter()
            .filter(|v| v.position[0] <= 4.0 && v.position[2] <= 4.0)
            .collect();
        assert_eq!(leaves.len(), 24);
        assert!(leaves.iter().all(|v| v.color[0] == 0.0 && approx(v.color[1], 0.8)));

        let grass_top: Vec<&Vertex> = meshes
            .opaque
            .vertices
            .iter()
            .filter(|v| v.position[0] >= 10.0 && v.normal == [0.0, 1.0, 0.0])
            .collect();
        assert_eq!(grass_top.len(), 4);
        assert!(grass_top.iter().all(|v| v.tex_coords[0] <= 1.0 / 16.0 + 1e-6
            && v.tex_coords[1] >= 15.0 / 16.0 - 1e-6));
    }
}
