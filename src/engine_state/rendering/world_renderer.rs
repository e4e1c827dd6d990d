//! Draws the voxel world, the hovered block outline and the hotbar slot.
//!
//! The emission helpers are generic over `GeometryDevice` so the geometry they produce
//! can be checked without a GPU. `WorldRenderer` wires them to the `RenderContext`:
//! it picks the program, texture and matrices for each batch.
//!
//! Blocks are drawn as one front-facing quad per block at the block's `z` plane. The
//! layer closest to the viewer is `z = depth - 1`; deeper layers are tinted grey and
//! only drawn where the layer in front of them does not cover them.

use cgmath::Vector3;

use crate::engine_state::{
    camera_state::{gui_projection, OrthoCamera},
    physics::Aabb,
    voxels::{
        block::{Block, BLOCK_TEXTURE_TILES},
        world::VoxelGrid,
    },
};

use super::{
    batch::{BatchBuffer, BatchScope, GeometryDevice},
    draw_mode::DrawMode,
    pipeline_manager::ShaderProgram,
    render_context::{BatchBuffers, RenderContext, TextureId},
};

/// Tint of blocks on the front layer.
pub const FRONT_TINT: u32 = 0xffffffff;
/// Tint of blocks behind the front layer.
pub const BACK_TINT: u32 = 0x808080ff;
/// Colour of the hovered block outline.
pub const OUTLINE_COLOR: u32 = 0x000000ff;
/// Size of the hotbar slot, in pixels.
pub const HOTBAR_SLOT_SIZE: f32 = 32.0;

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];
const OUTLINE_INDICES: [u32; 8] = [0, 1, 1, 2, 2, 3, 3, 0];

/// The block under the cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HitResult {
    /// Block column
    pub x: i32,
    /// Block row
    pub y: i32,
    /// Layer, always the front one
    pub z: i32,
    /// The block at the hit position, possibly air
    pub block: Block,
}

/// Finds the front-layer block under a cursor position.
///
/// # Arguments
/// * `camera` - The camera the world was drawn with
/// * `world` - The world to pick from
/// * `cursor_x` - Pixels from the left edge of the window
/// * `cursor_y` - Pixels from the top edge of the window
///
/// # Returns
/// The hit, or `None` when the cursor is outside the world.
pub fn pick(camera: &OrthoCamera, world: &VoxelGrid, cursor_x: f64, cursor_y: f64) -> Option<HitResult> {
    let point = camera.unproject(cursor_x, cursor_y);
    let x = point.x.floor() as i32;
    let y = point.y.floor() as i32;
    let z = world.depth() - 1;
    world.is_inside(x, y, z).then(|| HitResult {
        x,
        y,
        z,
        block: world.block_at(x, y, z),
    })
}

/// Horizontal texture range `(u0, u1)` of a block's tile in the block texture strip.
pub fn tile_uv(block: Block) -> Option<(f32, f32)> {
    block.texture_index().map(|index| {
        let tiles = BLOCK_TEXTURE_TILES as f32;
        (index as f32 / tiles, (index + 1) as f32 / tiles)
    })
}

/// Whether the block at a coordinate shows: it is solid and nothing in front hides it.
pub fn is_visible(world: &VoxelGrid, x: i32, y: i32, z: i32) -> bool {
    if world.block_at(x, y, z).is_air() {
        return false;
    }
    z == world.depth() - 1 || !world.block_at(x, y, z + 1).occludes()
}

/// Emits one textured quad covering `[x, x + 1] x [y, y + 1]` on the `z` plane.
///
/// Blocks without a texture tile emit nothing.
pub fn emit_block<B, D>(scope: &mut BatchScope<'_, B, D>, block: Block, x: f32, y: f32, z: f32, tint: u32)
where
    D: GeometryDevice<Buffers = B>,
{
    let Some((u0, u1)) = tile_uv(block) else {
        return;
    };
    let (v0, v1) = (0.0, 1.0);

    scope.indices(&QUAD_INDICES).color_rgba(tint);
    scope.vertex(x, y + 1.0, z).tex_coords(u0, v0).emit();
    scope.vertex(x, y, z).tex_coords(u0, v1).emit();
    scope.vertex(x + 1.0, y, z).tex_coords(u1, v1).emit();
    scope.vertex(x + 1.0, y + 1.0, z).tex_coords(u1, v0).emit();
}

/// Emits every visible block of the world.
///
/// # Returns
/// The number of quads emitted.
pub fn emit_world<B, D>(scope: &mut BatchScope<'_, B, D>, world: &VoxelGrid) -> usize
where
    D: GeometryDevice<Buffers = B>,
{
    let (width, height, depth) = world.dimensions();
    let mut quads = 0;
    for x in 0..width {
        for y in 0..height {
            for z in 0..depth {
                if !is_visible(world, x, y, z) {
                    continue;
                }
                let tint = if z == depth - 1 { FRONT_TINT } else { BACK_TINT };
                emit_block(scope, world.block_at(x, y, z), x as f32, y as f32, z as f32, tint);
                quads += 1;
            }
        }
    }
    quads
}

/// Emits the front rectangle of `outline` as a closed line loop.
pub fn emit_outline<B, D>(scope: &mut BatchScope<'_, B, D>, outline: &Aabb)
where
    D: GeometryDevice<Buffers = B>,
{
    let (x0, y0) = (outline.min_x() as f32, outline.min_y() as f32);
    let (x1, y1) = (outline.max_x() as f32, outline.max_y() as f32);

    scope.indices(&OUTLINE_INDICES).color_rgba(OUTLINE_COLOR);
    scope.vertex_2d(x0, y1).emit();
    scope.vertex_2d(x0, y0).emit();
    scope.vertex_2d(x1, y0).emit();
    scope.vertex_2d(x1, y1).emit();
}

/// Renders the world and the GUI through a `RenderContext`.
pub struct WorldRenderer {
    block_texture: TextureId,
    hit_result: Option<HitResult>,
}

impl WorldRenderer {
    /// Creates a renderer drawing blocks from the given block texture strip.
    pub fn new(block_texture: TextureId) -> Self {
        Self {
            block_texture,
            hit_result: None,
        }
    }

    /// Updates the hovered block from the cursor position.
    pub fn pick(&mut self, camera: &OrthoCamera, world: &VoxelGrid, cursor: (f64, f64)) {
        self.hit_result = pick(camera, world, cursor.0, cursor.1);
    }

    /// The block hovered at the last `pick`.
    pub fn hit_result(&self) -> Option<HitResult> {
        self.hit_result
    }

    /// Draws the blocks of `world` and the outline of the hovered block.
    pub fn render_world(
        &self,
        context: &mut RenderContext,
        batch: &mut BatchBuffer<BatchBuffers>,
        world: &VoxelGrid,
        camera: &OrthoCamera,
    ) {
        context.set_projection(*camera.projection());
        context.matrix_stack_mut().set(*camera.view());

        context.bind_texture(Some(self.block_texture));
        context.use_program(Some(ShaderProgram::PositionColorTex));
        let mut scope = batch.begin(DrawMode::Quads, context);
        emit_world(&mut scope, world);
        scope.end();

        let outline = self
            .hit_result
            .and_then(|hit| world.outline_shape(hit.x, hit.y, hit.z));
        if let Some(outline) = outline {
            context.use_program(Some(ShaderProgram::PositionColor));
            let mut scope = batch.begin(DrawMode::LineLoop, context);
            emit_outline(&mut scope, &outline);
            scope.end();
        }
        context.use_program(None);
    }

    /// Draws the selected hotbar block in the top-right corner of the window.
    pub fn render_hotbar(
        &self,
        context: &mut RenderContext,
        batch: &mut BatchBuffer<BatchBuffers>,
        selected: Block,
    ) {
        let (width, height) = context.size();
        context.set_projection(gui_projection(width, height));

        let stack = context.matrix_stack_mut();
        stack.push();
        stack.identity();
        stack.translate(Vector3::new(
            width as f32 - HOTBAR_SLOT_SIZE,
            height as f32 - HOTBAR_SLOT_SIZE,
            0.0,
        ));
        stack.scale(HOTBAR_SLOT_SIZE, HOTBAR_SLOT_SIZE, 1.0);

        context.bind_texture(Some(self.block_texture));
        context.use_program(Some(ShaderProgram::PositionColorTex));
        let mut scope = batch.begin(DrawMode::Quads, context);
        emit_block(&mut scope, selected, 0.0, 0.0, 0.0, FRONT_TINT);
        scope.end();
        context.use_program(None);

        context.matrix_stack_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::vertex::{Vertex, VERTEX_SIZE};

    /// Keeps the geometry of every flush.
    #[derive(Default)]
    struct CapturingDevice {
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        draws: Vec<(DrawMode, u32)>,
    }

    impl CapturingDevice {
        fn capture(&mut self, vertices: &[u8], indices: &[u32]) {
            self.vertices = vertices
                .chunks_exact(VERTEX_SIZE)
                .map(bytemuck::pod_read_unaligned)
                .collect();
            self.indices = indices.to_vec();
        }
    }

    impl GeometryDevice for CapturingDevice {
        type Buffers = ();

        fn create_buffers(&mut self, vertices: &[u8], indices: &[u32]) {
            self.capture(vertices, indices);
        }

        fn update_buffers(&mut self, _: &(), vertices: &[u8], indices: &[u32]) {
            self.capture(vertices, indices);
        }

        fn draw_indexed(&mut self, _: &(), mode: DrawMode, index_count: u32) {
            self.draws.push((mode, index_count));
        }

        fn release_buffers(&mut self, _: ()) {}
    }

    fn camera_at(x: f64, y: f64) -> OrthoCamera {
        let mut camera = OrthoCamera::new(864, 480);
        camera.follow(Vector3::new(x, y, 0.0));
        camera
    }

    #[test]
    fn pick_reads_the_front_layer() {
        let world = VoxelGrid::generate(16, 16, 2);
        let camera = camera_at(4.5, 6.5);

        let hit = pick(&camera, &world, 432.0, 240.0);
        assert_eq!(
            hit,
            Some(HitResult {
                x: 4,
                y: 6,
                z: 1,
                block: Block::Air
            })
        );

        // two blocks down is the grass layer
        let hit = pick(&camera, &world, 432.0, 240.0 + 64.0);
        assert_eq!(hit.map(|hit| (hit.y, hit.block)), Some((4, Block::GrassBlock)));
    }

    #[test]
    fn pick_misses_outside_the_world() {
        let world = VoxelGrid::generate(16, 16, 2);
        let camera = camera_at(0.5, 6.5);
        assert_eq!(pick(&camera, &world, 0.0, 240.0), None);
    }

    #[test]
    fn tiles_split_the_strip_evenly() {
        assert_eq!(tile_uv(Block::Air), None);
        assert_eq!(tile_uv(Block::Stone), Some((0.0, 0.2)));
        let (u0, u1) = tile_uv(Block::Bedrock).unwrap();
        assert!((u0 - 0.8).abs() < 1e-6 && (u1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn covered_back_blocks_are_skipped() {
        let mut world = VoxelGrid::generate(4, 8, 2);
        assert!(is_visible(&world, 0, 0, 1));
        assert!(!is_visible(&world, 0, 0, 0));
        assert!(!is_visible(&world, 0, 6, 1));

        world.set_block(0, 0, 1, Block::Air);
        assert!(is_visible(&world, 0, 0, 0));
    }

    #[test]
    fn world_emits_one_quad_per_visible_block() {
        let mut world = VoxelGrid::generate(4, 8, 2);
        world.set_block(2, 3, 1, Block::Air);

        let mut device = CapturingDevice::default();
        let mut batch = BatchBuffer::new(1000, 1500);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        let quads = emit_world(&mut scope, &world);
        scope.end();

        // 4 x 5 front blocks, one of them swapped for the block behind it
        assert_eq!(quads, 20);
        assert_eq!(device.draws, vec![(DrawMode::Quads, 120)]);

        let tints: Vec<[u8; 4]> = device.vertices.iter().take(80).map(|v| v.color).collect();
        assert_eq!(tints.iter().filter(|&&c| c == BACK_TINT.to_be_bytes()).count(), 4);
        assert_eq!(tints.iter().filter(|&&c| c == FRONT_TINT.to_be_bytes()).count(), 76);
    }

    #[test]
    fn block_quads_follow_the_winding() {
        let mut device = CapturingDevice::default();
        let mut batch = BatchBuffer::new(4, 6);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        emit_block(&mut scope, Block::Stone, 3.0, 2.0, 1.0, FRONT_TINT);
        scope.end();

        let corners: Vec<([f32; 3], [f32; 2])> = device
            .vertices
            .iter()
            .map(|v| (v.position, v.tex_coords))
            .collect();
        assert_eq!(
            corners,
            vec![
                ([3.0, 3.0, 1.0], [0.0, 0.0]),
                ([3.0, 2.0, 1.0], [0.0, 1.0]),
                ([4.0, 2.0, 1.0], [0.2, 1.0]),
                ([4.0, 3.0, 1.0], [0.2, 0.0]),
            ]
        );
        assert_eq!(&device.indices[..6], &QUAD_INDICES);
    }

    #[test]
    fn outline_is_a_black_loop_around_the_box() {
        let mut device = CapturingDevice::default();
        let mut batch = BatchBuffer::new(4, 8);
        let mut scope = batch.begin(DrawMode::LineLoop, &mut device);
        emit_outline(&mut scope, &Aabb::of_pos(2.0, 3.0, 1.0, 3.0, 4.0, 2.0));
        scope.end();

        assert_eq!(device.draws, vec![(DrawMode::LineLoop, 8)]);
        let positions: Vec<[f32; 3]> = device.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [2.0, 4.0, 0.0],
                [2.0, 3.0, 0.0],
                [3.0, 3.0, 0.0],
                [3.0, 4.0, 0.0]
            ]
        );
        assert!(device.vertices.iter().all(|v| v.color == [0, 0, 0, 0xff]));
    }
}
