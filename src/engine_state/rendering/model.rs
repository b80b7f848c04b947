//! Chunk models: a drawable surface plus the material it is drawn with.

use cgmath::Point3;

use super::meshing::MeshBuffers;
use super::surface::{BufferUsage, DrawableSurface, SurfaceFactory};
use super::vertex::Vertex;

/// Which pass a model is drawn in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Solid terrain, drawn first
    Opaque,
    /// Water, drawn after every opaque model
    Translucent,
}

/// A chunk's geometry for one material, uploaded to a drawable surface.
///
/// Vertex positions are chunk-local; `origin` is the world position of the chunk's
/// minimum corner.
pub struct ChunkModel {
    /// World position of the chunk's minimum corner
    pub origin: Point3<f32>,
    /// The pass this model belongs to
    pub material: MaterialKind,
    surface: Box<dyn DrawableSurface>,
    index_count: usize,
}

impl ChunkModel {
    /// Creates an empty model backed by a new surface.
    pub fn new(origin: Point3<f32>, material: MaterialKind, factory: &dyn SurfaceFactory) -> Self {
        ChunkModel {
            origin,
            material,
            surface: factory.create(&Vertex::desc(), BufferUsage::Dynamic),
            index_count: 0,
        }
    }

    /// Replaces the model's geometry.
    pub fn upload(&mut self, mesh: &MeshBuffers) {
        self.surface.upload_vertices(&mesh.vertices);
        self.surface.upload_indices(&mesh.indices);
        self.index_count = mesh.indices.len();
    }

    /// Number of indices last uploaded.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Returns `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.index_count == 0
    }

    /// Draws the model. Empty models are skipped.
    pub fn draw(&self) {
        if !self.is_empty() {
            self.surface.draw();
        }
    }
}
