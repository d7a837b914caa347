//! # Block Module
//!
//! This module provides the block registry: a fixed, load-time catalog of
//! block definitions (textures, overlays, culling properties) indexed by
//! [`BlockType`], plus the compact [`Block`] value stored in chunk grids.
//!
//! Adding a block type means adding one `BlockType` variant, one id entry and
//! one row in [`BLOCK_DEFINITIONS`]; nothing here depends on world state.

use block_type::{BlockType, BLOCK_TYPE_COUNT};

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Atlas offset used for faces and overlays that have no texture.
pub const NO_TEXTURE: [f32; 2] = [-1.0, -1.0];

/// Fraction of a block width by which inset blocks pull in their side faces.
pub const CACTUS_INSET: f32 = 1.0 / 16.0;

/// Immutable description of a block type.
///
/// Per-face tables are ordered like [`block_side::BlockSide`]:
/// [front, back, left, right, top, bottom]. Offsets are tile coordinates in
/// the texture atlas.
#[derive(Debug, Clone, Copy)]
pub struct BlockDefinition {
    /// Stable identity, e.g. `"minecraft:stone"`.
    pub id: &'static str,
    /// Human readable name.
    pub name: &'static str,
    pub texture_offsets: [[f32; 2]; 6],
    /// Tinted overlay drawn on top of the base texture, if any.
    pub overlay_offsets: [Option<[f32; 2]>; 6],
    /// Whether faces of neighboring blocks show through this block.
    pub is_transparent: bool,
    /// Whether two adjacent cells of this type hide their shared face.
    pub is_liquid: bool,
    /// Inward offset applied to the four side faces when meshing.
    pub face_inset: f32,
}

impl PartialEq for BlockDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BlockDefinition {}

impl BlockDefinition {
    const fn opaque(id: &'static str, name: &'static str, tile: [f32; 2]) -> Self {
        Self::sided(id, name, tile, tile, tile)
    }

    const fn sided(
        id: &'static str,
        name: &'static str,
        side: [f32; 2],
        top: [f32; 2],
        bottom: [f32; 2],
    ) -> Self {
        BlockDefinition {
            id,
            name,
            texture_offsets: [side, side, side, side, top, bottom],
            overlay_offsets: [None; 6],
            is_transparent: false,
            is_liquid: false,
            face_inset: 0.0,
        }
    }

    /// Texture offset for the given face.
    pub fn texture_offset(&self, side: block_side::BlockSide) -> [f32; 2] {
        self.texture_offsets[side as usize]
    }

    /// Overlay offset for the given face, [`NO_TEXTURE`] when there is none.
    pub fn overlay_offset(&self, side: block_side::BlockSide) -> [f32; 2] {
        self.overlay_offsets[side as usize].unwrap_or(NO_TEXTURE)
    }
}

/// The block registry, indexed by `BlockType as usize`.
pub static BLOCK_DEFINITIONS: [BlockDefinition; BLOCK_TYPE_COUNT] = [
    BlockDefinition {
        id: "minecraft:air",
        name: "Air",
        texture_offsets: [NO_TEXTURE; 6],
        overlay_offsets: [None; 6],
        is_transparent: true,
        is_liquid: false,
        face_inset: 0.0,
    },
    BlockDefinition::opaque("minecraft:stone", "Stone", [1.0, 0.0]),
    BlockDefinition::opaque("minecraft:dirt", "Dirt", [2.0, 0.0]),
    BlockDefinition {
        id: "minecraft:grass_block",
        name: "Grass Block",
        texture_offsets: [
            [3.0, 0.0],
            [3.0, 0.0],
            [3.0, 0.0],
            [3.0, 0.0],
            [0.0, 0.0],
            [2.0, 0.0],
        ],
        overlay_offsets: [
            Some([6.0, 2.0]),
            Some([6.0, 2.0]),
            Some([6.0, 2.0]),
            Some([6.0, 2.0]),
            Some([0.0, 0.0]),
            None,
        ],
        is_transparent: false,
        is_liquid: false,
        face_inset: 0.0,
    },
    BlockDefinition::opaque("minecraft:sand", "Sand", [2.0, 1.0]),
    BlockDefinition {
        face_inset: CACTUS_INSET,
        ..BlockDefinition::sided("minecraft:cactus", "Cactus", [6.0, 4.0], [5.0, 4.0], [7.0, 4.0])
    },
    BlockDefinition {
        is_transparent: true,
        is_liquid: true,
        ..BlockDefinition::opaque("minecraft:water", "Water", [13.0, 12.0])
    },
    BlockDefinition::opaque("minecraft:oak_planks", "Oak Planks", [4.0, 0.0]),
    BlockDefinition::sided("minecraft:oak_log", "Oak Log", [4.0, 1.0], [5.0, 1.0], [5.0, 1.0]),
    BlockDefinition {
        overlay_offsets: [Some([4.0, 3.0]); 6],
        is_transparent: true,
        ..BlockDefinition::opaque("minecraft:oak_leaves", "Oak Leaves", [4.0, 3.0])
    },
    BlockDefinition::opaque("minecraft:bedrock", "Bedrock", [1.0, 1.0]),
];

/// Represents a single voxel cell of a chunk grid.
///
/// # Memory Layout
/// `#[repr(C)]` and `Pod` let a whole grid be viewed as raw bytes, which is
/// what reproducibility checks compare.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    pub const AIR: Block = Block {
        block_type: BlockType::AIR as BlockTypeSize,
    };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    pub fn block_type(self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    /// Registry entry for this block, looked up without an enum round trip.
    #[inline]
    pub fn definition(self) -> &'static BlockDefinition {
        &BLOCK_DEFINITIONS[self.block_type as usize]
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.block_type == BlockType::AIR as BlockTypeSize
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::AIR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rows_match_enum_order() {
        let expected = [
            (BlockType::AIR, "minecraft:air"),
            (BlockType::STONE, "minecraft:stone"),
            (BlockType::DIRT, "minecraft:dirt"),
            (BlockType::GRASS, "minecraft:grass_block"),
            (BlockType::SAND, "minecraft:sand"),
            (BlockType::CACTUS, "minecraft:cactus"),
            (BlockType::WATER, "minecraft:water"),
            (BlockType::OAK_PLANKS, "minecraft:oak_planks"),
            (BlockType::OAK_LOG, "minecraft:oak_log"),
            (BlockType::OAK_LEAVES, "minecraft:oak_leaves"),
            (BlockType::BEDROCK, "minecraft:bedrock"),
        ];
        for (block_type, id) in expected {
            assert_eq!(block_type.definition().id, id);
        }
    }

    #[test]
    fn culling_properties() {
        assert!(BlockType::AIR.definition().is_transparent);
        assert!(BlockType::WATER.definition().is_transparent);
        assert!(BlockType::WATER.definition().is_liquid);
        assert!(BlockType::OAK_LEAVES.definition().is_transparent);
        assert!(!BlockType::OAK_LEAVES.definition().is_liquid);
        assert!(!BlockType::CACTUS.definition().is_transparent);
        assert!(!BlockType::STONE.definition().is_transparent);
        assert!(BlockType::CACTUS.definition().face_inset > 0.0);
    }

    #[test]
    fn equality_is_by_id() {
        let renamed = BlockDefinition {
            name: "Smooth Stone",
            ..*BlockType::STONE.definition()
        };
        assert_eq!(&renamed, BlockType::STONE.definition());
        assert_ne!(BlockType::STONE.definition(), BlockType::DIRT.definition());
    }

    #[test]
    fn grass_side_overlay_and_missing_bottom_overlay() {
        use block_side::BlockSide;
        let grass = BlockType::GRASS.definition();
        assert_eq!(grass.overlay_offset(BlockSide::LEFT), [6.0, 2.0]);
        assert_eq!(grass.overlay_offset(BlockSide::BOTTOM), NO_TEXTURE);
        assert_eq!(grass.texture_offset(BlockSide::TOP), [0.0, 0.0]);
    }
}
