//! # World Module
//!
//! This module provides the `VoxelGrid`, the dense block array the player lives in.
//!
//! ## Layout
//!
//! Blocks are stored as raw ids in a single flat vector indexed by
//! `(y * depth + z) * width + x`. The grid is bounded horizontally by four infinite
//! walls so nothing can leave it sideways; there is no floor or ceiling.
//!
//! ## Terrain
//!
//! A freshly generated world has the same five layers in every column, from bedrock at
//! `y = 0` up to grass at `y = 4`.

use crate::engine_state::physics::{Aabb, CollisionSource};

use super::block::{Block, BlockId};

/// Blocks placed by terrain generation, from `y = 0` upwards.
const TERRAIN_LAYERS: [Block; 5] = [
    Block::Bedrock,
    Block::Stone,
    Block::Cobblestone,
    Block::Dirt,
    Block::GrassBlock,
];

/// Largest number of blocks a world may hold. Keeps every coordinate and index in `i32`.
pub const MAX_WORLD_VOLUME: u64 = i32::MAX as u64;

/// A fixed-size voxel world.
///
/// # Examples
///
/// ```
/// use voxel_client::engine_state::voxels::{block::Block, world::VoxelGrid};
///
/// let mut world = VoxelGrid::generate(16, 8, 2);
/// assert_eq!(world.block_at(3, 4, 1), Block::GrassBlock);
///
/// world.set_block(3, 4, 1, Block::Air);
/// assert!(world.block_shape(3, 4, 1).is_none());
///
/// // Outside the grid everything is air and writes are ignored
/// world.set_block(-1, 0, 0, Block::Stone);
/// assert_eq!(world.block_at(-1, 0, 0), Block::Air);
/// ```
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    blocks: Vec<BlockId>,
    width: i32,
    height: i32,
    depth: i32,
    borders: [Aabb; 4],
}

impl VoxelGrid {
    /// Creates a world of the given size filled with air.
    ///
    /// # Arguments
    ///
    /// * `width` - Extent along X
    /// * `height` - Extent along Y
    /// * `depth` - Extent along Z
    ///
    /// # Panics
    ///
    /// When `width * height * depth` exceeds [`MAX_WORLD_VOLUME`].
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        let volume = u64::from(width) * u64::from(height) * u64::from(depth);
        assert!(
            volume <= MAX_WORLD_VOLUME,
            "world of {}x{}x{} blocks is too large",
            width,
            height,
            depth
        );
        let volume = volume as usize;
        let (w, d) = (f64::from(width), f64::from(depth));
        let inf = f64::INFINITY;

        Self {
            blocks: vec![Block::Air.id(); volume],
            width: width as i32,
            height: height as i32,
            depth: depth as i32,
            borders: [
                Aabb::of_pos(-inf, -inf, -inf, 0.0, inf, inf),
                Aabb::of_pos(w, -inf, -inf, inf, inf, inf),
                Aabb::of_pos(-inf, -inf, -inf, inf, inf, 0.0),
                Aabb::of_pos(-inf, -inf, d, inf, inf, inf),
            ],
        }
    }

    /// Creates a world and fills every column with the default terrain layers.
    pub fn generate(width: u32, height: u32, depth: u32) -> Self {
        let mut world = Self::new(width, height, depth);
        for x in 0..world.width {
            for z in 0..world.depth {
                for (y, block) in TERRAIN_LAYERS.iter().enumerate() {
                    world.set_block(x, y as i32, z, *block);
                }
            }
        }
        log::info!(
            "Generated {}x{}x{} world",
            world.width,
            world.height,
            world.depth
        );
        world
    }

    /// The world size as `(width, height, depth)`.
    pub fn dimensions(&self) -> (i32, i32, i32) {
        (self.width, self.height, self.depth)
    }

    /// Extent along X.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Extent along Y.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Extent along Z.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Whether the coordinate lies inside the grid.
    pub fn is_inside(&self, x: i32, y: i32, z: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y) && (0..self.depth).contains(&z)
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        self.is_inside(x, y, z)
            .then(|| {
                (y as usize * self.depth as usize + z as usize) * self.width as usize + x as usize
            })
    }

    /// Reads a block. Coordinates outside the grid read as air.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Block {
        self.index(x, y, z)
            .and_then(|index| Block::from_id(self.blocks[index]))
            .unwrap_or(Block::Air)
    }

    /// Writes a block. Writes outside the grid are ignored.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if let Some(index) = self.index(x, y, z) {
            self.blocks[index] = block.id();
        }
    }

    /// The world-space collision box of the block at a coordinate, if it has one.
    pub fn block_shape(&self, x: i32, y: i32, z: i32) -> Option<Aabb> {
        self.block_at(x, y, z)
            .collision_shape()
            .map(|shape| shape.translate(f64::from(x), f64::from(y), f64::from(z)))
    }

    /// The world-space outline of the block at a coordinate, if it has one.
    pub fn outline_shape(&self, x: i32, y: i32, z: i32) -> Option<Aabb> {
        self.block_at(x, y, z)
            .outline_shape()
            .map(|shape| shape.translate(f64::from(x), f64::from(y), f64::from(z)))
    }
}

/// Inclusive-exclusive block range covering `[min, max]`, clamped to `[0, limit)`.
fn block_range(min: f64, max: f64, limit: i32) -> std::ops::Range<i32> {
    let start = (min.floor() as i32).max(0);
    let end = (max.ceil() as i32).min(limit);
    start..end
}

impl CollisionSource for VoxelGrid {
    fn collision_boxes(&self, region: &Aabb) -> Vec<Aabb> {
        let mut boxes: Vec<Aabb> = self
            .borders
            .iter()
            .filter(|border| border.intersects(region))
            .copied()
            .collect();

        for y in block_range(region.min_y(), region.max_y(), self.height) {
            for z in block_range(region.min_z(), region.max_z(), self.depth) {
                for x in block_range(region.min_x(), region.max_x(), self.width) {
                    boxes.extend(self.block_shape(x, y, z));
                }
            }
        }

        boxes
    }
}
