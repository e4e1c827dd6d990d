//! Primitive kinds a batch can be drawn as.

use wgpu::PrimitiveTopology;

/// How the vertices of a batch are assembled into primitives.
///
/// Callers always supply explicit indices; the mode only fixes how many vertices and
/// indices make up one primitive and which GPU topology draws them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Independent triangles, indices `{0, 1, 2}`.
    Triangles,
    /// Quads split into two triangles, indices `{0, 1, 2, 2, 3, 0}`.
    Quads,
    /// A closed four-edge outline, indices `{0, 1, 1, 2, 2, 3, 3, 0}`.
    LineLoop,
}

impl DrawMode {
    /// Every mode, in pipeline creation order.
    pub const ALL: [DrawMode; 3] = [DrawMode::Triangles, DrawMode::Quads, DrawMode::LineLoop];

    /// Vertices emitted per primitive.
    pub fn primitive_vertices(self) -> usize {
        match self {
            DrawMode::Triangles => 3,
            DrawMode::Quads | DrawMode::LineLoop => 4,
        }
    }

    /// Indices supplied per primitive.
    pub fn primitive_indices(self) -> usize {
        match self {
            DrawMode::Triangles => 3,
            DrawMode::Quads => 6,
            DrawMode::LineLoop => 8,
        }
    }

    /// The topology the GPU draws the indices with.
    pub fn topology(self) -> PrimitiveTopology {
        match self {
            DrawMode::Triangles | DrawMode::Quads => PrimitiveTopology::TriangleList,
            DrawMode::LineLoop => PrimitiveTopology::LineList,
        }
    }
}
