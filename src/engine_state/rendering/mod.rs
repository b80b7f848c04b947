//! Rendering side of the voxel world.
//!
//! Chunks own their models; this module defines what a model is, how its geometry is
//! built, and the [`DrawList`] deciding which models are drawn and in which order.
//! The graphics API itself stays behind the [`surface::DrawableSurface`] trait.

use cgmath::Point3;

use super::voxels::world::World;

pub mod atlas;
pub mod meshing;
pub mod model;
pub mod surface;
mod vertex;

// Re-export commonly used types
pub use model::{ChunkModel, MaterialKind};
pub use vertex::{Vertex, VertexAttribute, VertexFormat, VertexLayout};

/// The set of chunk models submitted every frame.
///
/// Entries are grid coordinates, not references: the chunk registry stays the only owner
/// of a chunk and its models. An entry must be removed before its chunk is evicted so
/// the next frame never asks for a destroyed model.
#[derive(Debug, Default)]
pub struct DrawList {
    entries: Vec<(Point3<i32>, MaterialKind)>,
}

impl DrawList {
    /// Creates an empty draw list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds both models of a chunk. Adding a chunk twice has no effect.
    pub fn insert_chunk(&mut self, grid: Point3<i32>) {
        if self.contains(grid) {
            return;
        }
        self.entries.push((grid, MaterialKind::Opaque));
        self.entries.push((grid, MaterialKind::Translucent));
    }

    /// Removes every entry of a chunk and returns how many were removed.
    pub fn remove_chunk(&mut self, grid: Point3<i32>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != grid);
        before - self.entries.len()
    }

    /// Whether the chunk's models are in the list.
    pub fn contains(&self, grid: Point3<i32>) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == grid)
    }

    /// Number of models in the list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list holds no models.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws every listed model, all opaque models before any translucent one.
    ///
    /// # Returns
    /// The number of non-empty models drawn.
    pub fn draw(&self, world: &World) -> usize {
        let mut drawn = 0;
        for pass in [MaterialKind::Opaque, MaterialKind::Translucent] {
            for (grid, _) in self.entries.iter().filter(|(_, material)| *material == pass) {
                if let Some(model) = world.lookup(*grid).and_then(|chunk| chunk.model(pass)) {
                    if !model.is_empty() {
                        model.draw();
                        drawn += 1;
                    }
                }
            }
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_listed_once_and_removed_completely() {
        let mut list = DrawList::new();
        let grid = Point3::new(1, 0, -1);
        list.insert_chunk(grid);
        list.insert_chunk(grid);
        list.insert_chunk(Point3::new(0, 0, 0));
        assert_eq!(list.len(), 4);
        assert!(list.contains(grid));

        assert_eq!(list.remove_chunk(grid), 2);
        assert!(!list.contains(grid));
        assert_eq!(list.remove_chunk(grid), 0);
        assert_eq!(list.len(), 2);
    }
}
