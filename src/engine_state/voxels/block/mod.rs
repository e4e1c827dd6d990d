//! # Block Module
//!
//! The closed set of block kinds that make up the voxel world, along with their
//! shapes, texture tiles and name lookup.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::engine_state::physics::Aabb;

/// The underlying integer type used to store blocks in the world grid.
pub type BlockId = u8;

/// Number of tiles in the block texture strip.
pub const BLOCK_TEXTURE_TILES: u32 = 5;

/// Maps each solid block to its tile in the block texture strip.
///
/// Indexed by `Block` as a `usize`. Air has no tile.
static BLOCK_TO_TEXTURE_INDEX: [Option<u32>; 6] = [
    None,    // AIR
    Some(0), // STONE
    Some(1), // GRASS_BLOCK (side texture)
    Some(2), // DIRT
    Some(3), // COBBLESTONE
    Some(4), // BEDROCK
];

/// Lookup from a block's registry name to the block.
pub static BLOCKS_BY_NAME: phf::Map<&'static str, Block> = phf::phf_map! {
    "air" => Block::Air,
    "stone" => Block::Stone,
    "grass_block" => Block::GrassBlock,
    "dirt" => Block::Dirt,
    "cobblestone" => Block::Cobblestone,
    "bedrock" => Block::Bedrock,
};

/// Every kind of block in the world.
///
/// The discriminants are the stable raw ids stored in the world grid.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, FromPrimitive)]
pub enum Block {
    /// Empty space.
    #[default]
    Air = 0,
    /// Plain stone.
    Stone = 1,
    /// Dirt with a grass top.
    GrassBlock = 2,
    /// Plain dirt.
    Dirt = 3,
    /// Broken stone, placed just above bedrock.
    Cobblestone = 4,
    /// The indestructible bottom layer.
    Bedrock = 5,
}

impl Block {
    /// Converts a raw id back into a block.
    ///
    /// # Returns
    /// `None` if no block has that id.
    pub fn from_id(id: BlockId) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }

    /// The raw id this block is stored as.
    pub fn id(self) -> BlockId {
        self as BlockId
    }

    /// Looks a block up by its registry name, e.g. `"grass_block"`.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCKS_BY_NAME.get(name).copied()
    }

    /// The registry name of this block.
    pub fn name(self) -> &'static str {
        match self {
            Block::Air => "air",
            Block::Stone => "stone",
            Block::GrassBlock => "grass_block",
            Block::Dirt => "dirt",
            Block::Cobblestone => "cobblestone",
            Block::Bedrock => "bedrock",
        }
    }

    /// Whether this is the empty block.
    pub fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    /// Whether placing a block at this position may overwrite it.
    pub fn can_be_replaced(self) -> bool {
        self.is_air()
    }

    /// Whether this block hides the block directly behind it.
    pub fn occludes(self) -> bool {
        !self.is_air()
    }

    /// The collision box in block-local coordinates, `None` for blocks that can be
    /// walked through.
    pub fn collision_shape(self) -> Option<Aabb> {
        match self {
            Block::Air => None,
            _ => Some(Aabb::UNIT),
        }
    }

    /// The box drawn around the block when the cursor hovers it.
    pub fn outline_shape(self) -> Option<Aabb> {
        self.collision_shape()
    }

    /// The tile of this block in the block texture strip.
    pub fn texture_index(self) -> Option<u32> {
        BLOCK_TO_TEXTURE_INDEX[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Block; 6] = [
        Block::Air,
        Block::Stone,
        Block::GrassBlock,
        Block::Dirt,
        Block::Cobblestone,
        Block::Bedrock,
    ];

    #[test]
    fn ids_and_names_round_trip() {
        for block in ALL {
            assert_eq!(Block::from_id(block.id()), Some(block));
            assert_eq!(Block::from_name(block.name()), Some(block));
        }
        assert_eq!(Block::from_id(6), None);
        assert_eq!(Block::from_name("glass"), None);
    }

    #[test]
    fn only_air_is_passable() {
        assert_eq!(Block::Air.collision_shape(), None);
        assert!(Block::Air.can_be_replaced());
        assert!(!Block::Air.occludes());
        for block in &ALL[1..] {
            assert_eq!(block.collision_shape(), Some(Aabb::UNIT));
            assert!(!block.can_be_replaced());
            assert!(block.occludes());
        }
    }

    #[test]
    fn every_solid_block_has_a_distinct_tile() {
        let mut tiles: Vec<u32> = ALL.iter().filter_map(|b| b.texture_index()).collect();
        assert_eq!(tiles.len(), 5);
        tiles.sort_unstable();
        tiles.dedup();
        assert_eq!(tiles.len(), 5);
        assert!(tiles.iter().all(|&tile| tile < BLOCK_TEXTURE_TILES));
    }
}
