//! Texture handling for the rendering pipeline.
//!
//! This module decodes images into GPU textures. A file that is missing or cannot be
//! decoded is replaced by a generated magenta and black checkerboard so the client keeps
//! running with an obviously wrong texture instead of failing.

use std::path::Path;

use image::RgbaImage;
use wgpu::util::DeviceExt;

/// Edge length of one checker square in the placeholder.
const PLACEHOLDER_CHECKER: u32 = 8;

/// Represents a GPU texture with associated view and sampler.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// The texture format used for colour textures.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Uploads an RGBA image.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The queue the initial upload is written through
    /// * `image` - Pixel data, row-major from the top-left corner
    /// * `label` - Debug label for the texture
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Self::FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Pixel art: no filtering, no wrapping between tiles
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Frees the GPU memory now instead of when the last handle is dropped.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Reads an image file, falling back to a placeholder of `fallback_size` pixels.
///
/// # Returns
/// The decoded image, or the placeholder after logging a warning.
pub fn load_image_or_placeholder(path: &Path, fallback_size: (u32, u32)) -> RgbaImage {
    match image::open(path) {
        Ok(image) => {
            log::info!("Loaded texture {}", path.display());
            image.to_rgba8()
        }
        Err(err) => {
            log::warn!(
                "Could not load texture {}: {}. Using a placeholder",
                path.display(),
                err
            );
            placeholder_image(fallback_size.0, fallback_size.1)
        }
    }
}

/// Generates a magenta and black checkerboard.
pub fn placeholder_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width.max(1), height.max(1), |x, y| {
        if (x / PLACEHOLDER_CHECKER + y / PLACEHOLDER_CHECKER) % 2 == 0 {
            image::Rgba([0xff, 0x00, 0xff, 0xff])
        } else {
            image::Rgba([0x00, 0x00, 0x00, 0xff])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_a_checkerboard() {
        let image = placeholder_image(32, 16);
        assert_eq!(image.dimensions(), (32, 16));
        assert_eq!(image.get_pixel(0, 0).0, [0xff, 0x00, 0xff, 0xff]);
        assert_eq!(image.get_pixel(8, 0).0, [0x00, 0x00, 0x00, 0xff]);
        assert_eq!(image.get_pixel(8, 8).0, [0xff, 0x00, 0xff, 0xff]);
    }

    #[test]
    fn missing_files_fall_back_to_the_placeholder() {
        let image = load_image_or_placeholder(Path::new("does/not/exist.png"), (80, 16));
        assert_eq!(image.dimensions(), (80, 16));
    }

    #[test]
    fn placeholder_is_never_empty() {
        assert_eq!(placeholder_image(0, 0).dimensions(), (1, 1));
    }
}
