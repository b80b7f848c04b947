//! Drawable surfaces.
//!
//! The mesher never talks to a graphics API directly. It asks a [`SurfaceFactory`] for a
//! [`DrawableSurface`], replaces the surface's vertex and index data whenever the chunk is
//! rebuilt, and asks it to draw. A windowed front end implements these traits on top of its
//! GPU buffers; [`HeadlessSurfaceFactory`] keeps the bytes in memory and counts the work,
//! which is what the headless binary and the tests use.

use std::cell::Cell;
use std::rc::Rc;

use super::vertex::{Vertex, VertexLayout};

/// How often the data of a surface is expected to change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    Static,
    /// Static between uploads, but rebuilt frequently. Chunk meshes use this.
    Dynamic,
}

/// A vertex and index buffer pair that can be drawn.
pub trait DrawableSurface {
    /// Replaces all vertex data.
    fn upload_vertices(&mut self, vertices: &[Vertex]);

    /// Replaces all index data.
    fn upload_indices(&mut self, indices: &[u32]);

    /// Submits the surface for drawing.
    fn draw(&self);
}

/// Creates drawable surfaces.
pub trait SurfaceFactory {
    /// Creates an empty surface for vertices with the given layout.
    fn create(&self, layout: &VertexLayout, usage: BufferUsage) -> Box<dyn DrawableSurface>;
}

/// Counters shared between a [`HeadlessSurfaceFactory`] and the surfaces it created.
#[derive(Debug, Default)]
pub struct SurfaceStats {
    /// Surfaces currently alive
    pub live_surfaces: Cell<u64>,
    /// Vertex and index uploads
    pub uploads: Cell<u64>,
    /// Bytes of vertex data uploaded in total
    pub uploaded_bytes: Cell<u64>,
    /// Calls to `draw`
    pub draw_calls: Cell<u64>,
    /// Triangles submitted by `draw`
    pub triangles_drawn: Cell<u64>,
}

fn bump(counter: &Cell<u64>, amount: u64) {
    counter.set(counter.get() + amount);
}

/// A surface that keeps its data in memory.
pub struct HeadlessSurface {
    stats: Rc<SurfaceStats>,
    vertex_data: Vec<u8>,
    index_data: Vec<u32>,
}

impl HeadlessSurface {
    /// The raw vertex bytes last uploaded.
    pub fn vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    /// The indices last uploaded.
    pub fn index_data(&self) -> &[u32] {
        &self.index_data
    }
}

impl DrawableSurface for HeadlessSurface {
    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.vertex_data.clear();
        self.vertex_data
            .extend_from_slice(bytemuck::cast_slice(vertices));
        bump(&self.stats.uploads, 1);
        bump(&self.stats.uploaded_bytes, self.vertex_data.len() as u64);
    }

    fn upload_indices(&mut self, indices: &[u32]) {
        self.index_data.clear();
        self.index_data.extend_from_slice(indices);
        bump(&self.stats.uploads, 1);
    }

    fn draw(&self) {
        bump(&self.stats.draw_calls, 1);
        bump(&self.stats.triangles_drawn, self.index_data.len() as u64 / 3);
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        let live = self.stats.live_surfaces.get();
        self.stats.live_surfaces.set(live.saturating_sub(1));
    }
}

/// Creates [`HeadlessSurface`]s and shares one [`SurfaceStats`] between them.
#[derive(Default)]
pub struct HeadlessSurfaceFactory {
    stats: Rc<SurfaceStats>,
}

impl HeadlessSurfaceFactory {
    /// Creates a factory with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// The counters of every surface this factory created.
    pub fn stats(&self) -> Rc<SurfaceStats> {
        self.stats.clone()
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create(&self, layout: &VertexLayout, _usage: BufferUsage) -> Box<dyn DrawableSurface> {
        bump(&self.stats.live_surfaces, 1);
        Box::new(HeadlessSurface {
            stats: self.stats.clone(),
            vertex_data: Vec::with_capacity(layout.array_stride as usize * 4),
            index_data: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_and_draws_are_counted() {
        let factory = HeadlessSurfaceFactory::new();
        let stats = factory.stats();
        let mut surface = factory.create(&Vertex::desc(), BufferUsage::Dynamic);
        assert_eq!(stats.live_surfaces.get(), 1);

        let vertex = Vertex::new([0.0; 3], [0.0; 2], [0.0, 1.0, 0.0], [1.0; 4]);
        surface.upload_vertices(&[vertex; 4]);
        surface.upload_indices(&[0, 1, 2, 2, 3, 0]);
        surface.draw();

        assert_eq!(stats.uploads.get(), 2);
        assert_eq!(stats.uploaded_bytes.get(), 4 * 48);
        assert_eq!(stats.draw_calls.get(), 1);
        assert_eq!(stats.triangles_drawn.get(), 2);

        drop(surface);
        assert_eq!(stats.live_surfaces.get(), 0);
    }
}
