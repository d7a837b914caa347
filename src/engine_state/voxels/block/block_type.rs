//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification and conversion
//! between the compact stored form, the enum and the stable string id.

use num_derive::FromPrimitive;

use super::{BlockDefinition, BlockTypeSize, BLOCK_DEFINITIONS};

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant doubles as the index into [`BLOCK_DEFINITIONS`] and as the
/// value stored in a chunk's grid. The `FromPrimitive` derive converts stored
/// values back into the enum.
#[repr(u8)]
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Transparent, never meshed.
    AIR,
    STONE,
    DIRT,
    /// Dirt with a tinted grass top and tinted side overlays.
    GRASS,
    SAND,
    /// Inset visual footprint, full cube for culling.
    CACTUS,
    /// Transparent liquid; faces between two water cells are suppressed.
    WATER,
    OAK_PLANKS,
    OAK_LOG,
    OAK_LEAVES,
    /// Indestructible world floor at y = 0.
    BEDROCK,
}

/// Number of entries in the block registry.
pub const BLOCK_TYPE_COUNT: usize = 11;

/// Maps stable string ids to block types.
///
/// Generated at compile time, so lookups never allocate or hash at runtime
/// beyond the perfect hash itself.
static BLOCK_IDS: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "minecraft:air" => BlockType::AIR,
    "minecraft:stone" => BlockType::STONE,
    "minecraft:dirt" => BlockType::DIRT,
    "minecraft:grass_block" => BlockType::GRASS,
    "minecraft:sand" => BlockType::SAND,
    "minecraft:cactus" => BlockType::CACTUS,
    "minecraft:water" => BlockType::WATER,
    "minecraft:oak_planks" => BlockType::OAK_PLANKS,
    "minecraft:oak_log" => BlockType::OAK_LOG,
    "minecraft:oak_leaves" => BlockType::OAK_LEAVES,
    "minecraft:bedrock" => BlockType::BEDROCK,
};

impl BlockType {
    /// Converts a stored `BlockTypeSize` back into a `BlockType`.
    ///
    /// # Panics
    /// Panics if the value doesn't correspond to a registered block type. Grids
    /// are only ever written through `BlockType`, so this indicates corruption.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        let btype_option = num::FromPrimitive::from_u8(btype);
        btype_option.unwrap_or_else(|| panic!("unregistered block type discriminant {}", btype))
    }

    /// Resolves a stable string id such as `"minecraft:stone"`.
    pub fn from_id(id: &str) -> Option<Self> {
        BLOCK_IDS.get(id).copied()
    }

    /// The registry entry describing this block type.
    pub fn definition(self) -> &'static BlockDefinition {
        &BLOCK_DEFINITIONS[self as usize]
    }

    /// Stable string id of this block type.
    pub fn id(self) -> &'static str {
        self.definition().id
    }

    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }
}
