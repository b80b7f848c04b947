//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format produced by the chunk mesher and the layout
//! description handed to the drawable surface when it is created.

use std::mem::size_of;

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Color: [f32; 4] (16 bytes)
///
/// Total size: 48 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position relative to the chunk origin
    pub position: [f32; 3],
    /// Atlas texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Outward face normal
    pub normal: [f32; 3],
    /// Per-vertex tint, already multiplied by the corner light sample
    pub color: [f32; 4],
}

/// Scalar layout of one vertex attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    /// Two 32-bit floats
    Float32x2,
    /// Three 32-bit floats
    Float32x3,
    /// Four 32-bit floats
    Float32x4,
}

/// One attribute inside a vertex, as seen by the vertex shader.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Byte offset from the start of the vertex
    pub offset: u64,
    /// Shader input location
    pub shader_location: u32,
    /// Scalar layout
    pub format: VertexFormat,
}

/// Describes how a vertex buffer is laid out in memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    /// Distance in bytes between consecutive vertices
    pub array_stride: u64,
    /// The attributes of each vertex
    pub attributes: &'static [VertexAttribute],
}

const VERTEX_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: VertexFormat::Float32x3,
    },
    VertexAttribute {
        offset: size_of::<[f32; 3]>() as u64,
        shader_location: 1,
        format: VertexFormat::Float32x2,
    },
    VertexAttribute {
        offset: size_of::<[f32; 5]>() as u64,
        shader_location: 2,
        format: VertexFormat::Float32x3,
    },
    VertexAttribute {
        offset: size_of::<[f32; 8]>() as u64,
        shader_location: 3,
        format: VertexFormat::Float32x4,
    },
];

impl Vertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `position` - The position of the vertex relative to the chunk origin
    /// * `tex_coords` - Atlas texture coordinates
    /// * `normal` - The normal of the face this vertex belongs to
    /// * `color` - RGBA tint
    ///
    /// # Returns
    /// A new `Vertex` instance
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3], color: [f32; 4]) -> Self {
        Vertex {
            position,
            tex_coords,
            normal,
            color,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: normal (vec3<f32>)
    /// - `location = 3`: color (vec4<f32>)
    pub fn desc() -> VertexLayout {
        VertexLayout {
            array_stride: size_of::<Vertex>() as u64,
            attributes: &VERTEX_ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 48);
        assert_eq!(layout.attributes.len(), 4);
        assert_eq!(layout.attributes[3].offset, 32);
    }
}
