//! # Camera Implementation
//!
//! An orthographic side-on camera that looks down the negative Z axis at the world,
//! and the screen-space projection used for the GUI.
//!
//! ## Key Components
//! - `OrthoCamera`: Follows a world position and maps blocks to a fixed pixel size
//! - `gui_projection`: Pixel-space projection with the origin in the bottom-left corner

use cgmath::{ortho, Matrix4, Point3, SquareMatrix, Vector3, Vector4};

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// Both projections below are built OpenGL style, with clip-space Z in `[-1, 1]`.
/// WGPU expects Z in `[0, 1]`, so this matrix:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// On-screen size of one block, in pixels.
pub const PIXELS_PER_BLOCK: f32 = 32.0;

/// Depth range of both projections, symmetric around the camera.
const DEPTH_RANGE: f32 = 100.0;

/// Builds a pixel-space projection for a `width` x `height` viewport.
///
/// `(0, 0)` is the bottom-left corner and `(width, height)` the top-right.
pub fn gui_projection(width: u32, height: u32) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
        * ortho(
            0.0,
            width as f32,
            0.0,
            height as f32,
            -DEPTH_RANGE,
            DEPTH_RANGE,
        )
}

/// A camera centred on a world position, drawing blocks at `PIXELS_PER_BLOCK`.
///
/// # Fields
/// - `position`: The world point at the centre of the screen
/// - `combined`: Projection times view, uploaded to the shaders
/// - `inverse`: Inverse of `combined`, used for picking
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    /// The world point at the centre of the screen
    pub position: Vector3<f64>,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    combined: Matrix4<f32>,
    inverse: Matrix4<f32>,
    viewport: (u32, u32),
}

impl OrthoCamera {
    /// Creates a camera for a `width` x `height` viewport, centred on the origin.
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
            combined: Matrix4::identity(),
            inverse: Matrix4::identity(),
            viewport: (1, 1),
        };
        camera.resize(width, height);
        camera
    }

    /// Adapts the projection to a new viewport size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        let (half_width, half_height) = (width as f32 * 0.5, height as f32 * 0.5);
        self.projection = OPENGL_TO_WGPU_MATRIX
            * ortho(
                -half_width,
                half_width,
                -half_height,
                half_height,
                -DEPTH_RANGE,
                DEPTH_RANGE,
            );
        self.update();
    }

    /// Centres the camera on `position`, typically the interpolated player position.
    pub fn follow(&mut self, position: Vector3<f64>) {
        self.position = position;
        self.update();
    }

    fn update(&mut self) {
        let offset = -self.position.cast::<f32>().unwrap_or(Vector3::new(0.0, 0.0, 0.0));
        self.view = Matrix4::from_scale(PIXELS_PER_BLOCK) * Matrix4::from_translation(offset);
        self.combined = self.projection * self.view;
        if let Some(inverse) = self.combined.invert() {
            self.inverse = inverse;
        }
    }

    /// The orthographic projection for the current viewport.
    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    /// The view matrix centred on the followed position.
    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    /// Projection times view.
    pub fn combined(&self) -> &Matrix4<f32> {
        &self.combined
    }

    /// Inverse of the combined matrix.
    pub fn inverse(&self) -> &Matrix4<f32> {
        &self.inverse
    }

    /// Maps a window position to the world point under it on the camera's near plane.
    ///
    /// # Arguments
    /// * `cursor_x` - Pixels from the left edge of the window
    /// * `cursor_y` - Pixels from the top edge of the window
    ///
    /// # Returns
    /// The world-space point; only X and Y are meaningful for this camera.
    pub fn unproject(&self, cursor_x: f64, cursor_y: f64) -> Point3<f32> {
        let (width, height) = self.viewport;
        let ndc_x = (2.0 * cursor_x / f64::from(width) - 1.0) as f32;
        let ndc_y = (1.0 - 2.0 * cursor_y / f64::from(height)) as f32;
        let world = self.inverse * Vector4::new(ndc_x, ndc_y, 0.0, 1.0);
        Point3::new(world.x / world.w, world.y / world.w, world.z / world.w)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Transform;

    use super::*;

    fn camera() -> OrthoCamera {
        let mut camera = OrthoCamera::new(864, 480);
        camera.follow(Vector3::new(0.5, 5.0, 1.5));
        camera
    }

    #[test]
    fn screen_centre_is_the_followed_position() {
        let point = camera().unproject(432.0, 240.0);
        assert!((point.x - 0.5).abs() < 1e-4);
        assert!((point.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn one_block_is_32_pixels() {
        let camera = camera();
        let right = camera.unproject(432.0 + 32.0, 240.0);
        let up = camera.unproject(432.0, 240.0 - 32.0);
        assert!((right.x - 1.5).abs() < 1e-4);
        assert!((up.y - 6.0).abs() < 1e-4);
    }

    #[test]
    fn combined_maps_position_to_the_centre_of_clip_space() {
        let camera = camera();
        let clip = camera
            .combined()
            .transform_point(Point3::new(0.5, 5.0, 1.5));
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&clip.z));
    }

    #[test]
    fn zero_sized_viewport_keeps_the_last_projection() {
        let mut camera = camera();
        let before = *camera.combined();
        camera.resize(0, 0);
        assert_eq!(*camera.combined(), before);
    }

    #[test]
    fn gui_projection_puts_the_origin_bottom_left() {
        let projection = gui_projection(800, 600);
        let origin = projection.transform_point(Point3::new(0.0, 0.0, 0.0));
        let corner = projection.transform_point(Point3::new(800.0, 600.0, 0.0));
        assert!((origin.x + 1.0).abs() < 1e-6 && (origin.y + 1.0).abs() < 1e-6);
        assert!((corner.x - 1.0).abs() < 1e-6 && (corner.y - 1.0).abs() < 1e-6);
    }
}
