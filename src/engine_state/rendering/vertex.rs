//! Vertex data structures and layouts for batched rendering.
//!
//! Every batch uses the same vertex format: a position, a packed colour and a pair of
//! texture coordinates.

use wgpu::VertexAttribute;

/// A vertex as written into the batch buffer and read by the vertex shader.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Colour: [u8; 4] RGBA (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world or screen space, depending on the active projection
    pub position: [f32; 3],
    /// RGBA colour, normalized to `[0, 1]` by the vertex fetch
    pub color: [u8; 4],
    /// UV texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
}

/// Size of one vertex in bytes, which is also the vertex buffer stride.
pub const VERTEX_SIZE: usize = std::mem::size_of::<Vertex>();

const ATTRIBUTES: [VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Unorm8x4, 2 => Float32x2];

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            color: [0xff; 4],
            tex_coords: [0.0; 2],
        }
    }
}

impl Vertex {
    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: color (vec4<f32>, from unorm bytes)
    /// - `location = 2`: tex_coords (vec2<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: VERTEX_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_24_bytes() {
        assert_eq!(VERTEX_SIZE, 24);
        assert_eq!(ATTRIBUTES[1].offset, 12);
        assert_eq!(ATTRIBUTES[2].offset, 16);
    }

    #[test]
    fn bytes_are_position_then_color_then_uv() {
        let vertex = Vertex {
            position: [1.0, 2.0, 3.0],
            color: [0x11, 0x22, 0x33, 0x44],
            tex_coords: [0.5, 0.25],
        };
        let bytes = bytemuck::bytes_of(&vertex);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &[0x11, 0x22, 0x33, 0x44]);
        assert_eq!(&bytes[20..24], &0.25f32.to_ne_bytes());
    }
}
