//! # Feature Placement
//!
//! Stamps multi-block structures (trees, cacti) into a single chunk. Callers
//! decide *whether* a feature goes into a column; these functions only decide
//! *what* it looks like.
//!
//! Every write goes through [`Chunk::set_if_vacant`]: parts of a structure
//! that would land outside the chunk are dropped, and structures never replace
//! terrain or each other. Structures never spill into neighboring chunks, so a
//! tree next to a chunk border is clipped.

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::Chunk;

/// Height of a tree trunk above its base block.
pub const TREE_TRUNK_HEIGHT: i32 = 2;
/// Leaf layer radii, bottom to top, starting right above the trunk.
pub const TREE_CANOPY_RADII: [i32; 3] = [2, 2, 1];
/// Inclusive range of cactus heights.
pub const CACTUS_HEIGHT_RANGE: std::ops::RangeInclusive<u32> = 1..=3;

/// Places an oak tree standing on the block at local `(x, base, z)`.
///
/// Logs fill the two cells above the base, followed by square leaf layers of
/// radius 2, 2 and 1, capped by a five block cross.
pub fn place_tree(chunk: &mut Chunk, x: i32, base: i32, z: i32) {
    for dy in 1..=TREE_TRUNK_HEIGHT {
        chunk.set_if_vacant(x, base + dy, z, BlockType::OAK_LOG);
    }

    let mut y = base + TREE_TRUNK_HEIGHT + 1;
    for radius in TREE_CANOPY_RADII {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                chunk.set_if_vacant(x + dx, y, z + dz, BlockType::OAK_LEAVES);
            }
        }
        y += 1;
    }

    for (dx, dz) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
        chunk.set_if_vacant(x + dx, y, z + dz, BlockType::OAK_LEAVES);
    }
}

/// Places a cactus standing on the block at local `(x, base, z)`.
///
/// The height is drawn from [`CACTUS_HEIGHT_RANGE`]. Cells above the top of the
/// world are skipped.
///
/// # Returns
/// The height that was drawn.
pub fn place_cactus(chunk: &mut Chunk, x: i32, base: i32, z: i32, rng: &mut fastrand::Rng) -> u32 {
    let height = rng.u32(CACTUS_HEIGHT_RANGE);
    for dy in 1..=height as i32 {
        chunk.set_if_vacant(x, base + dy, z, BlockType::CACTUS);
    }
    height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::{ChunkCoord, CHUNK_SIZE_Y};

    fn count(chunk: &Chunk, block_type: BlockType) -> usize {
        chunk
            .iter_blocks()
            .filter(|(_, block)| block.block_type() == block_type)
            .count()
    }

    #[test]
    fn full_tree_in_the_middle_of_a_chunk() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        place_tree(&mut chunk, 8, 60, 8);

        assert_eq!(count(&chunk, BlockType::OAK_LOG), 2);
        // 25 + 25 + 9 + 5
        assert_eq!(count(&chunk, BlockType::OAK_LEAVES), 64);
        assert_eq!(chunk.get_block_type(8, 61, 8), BlockType::OAK_LOG);
        assert_eq!(chunk.get_block_type(8, 62, 8), BlockType::OAK_LOG);
        assert_eq!(chunk.get_block_type(10, 63, 10), BlockType::OAK_LEAVES);
        assert_eq!(chunk.get_block_type(9, 65, 9), BlockType::OAK_LEAVES);
        assert_eq!(chunk.get_block_type(8, 66, 8), BlockType::OAK_LEAVES);
        assert_eq!(chunk.get_block_type(9, 66, 9), BlockType::AIR);
    }

    #[test]
    fn tree_at_chunk_corner_is_clipped() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        place_tree(&mut chunk, 0, 60, 0);

        assert_eq!(count(&chunk, BlockType::OAK_LOG), 2);
        // 9 + 9 + 4 + 3
        assert_eq!(count(&chunk, BlockType::OAK_LEAVES), 25);
    }

    #[test]
    fn tree_at_world_top_is_clipped() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        let top = CHUNK_SIZE_Y as i32 - 1;
        place_tree(&mut chunk, 8, top - 1, 8);

        assert_eq!(count(&chunk, BlockType::OAK_LOG), 1);
        assert_eq!(count(&chunk, BlockType::OAK_LEAVES), 0);
    }

    #[test]
    fn leaves_do_not_replace_terrain() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        chunk.set(10, 63, 8, BlockType::STONE);
        place_tree(&mut chunk, 8, 60, 8);
        assert_eq!(chunk.get_block_type(10, 63, 8), BlockType::STONE);
        assert_eq!(count(&chunk, BlockType::OAK_LEAVES), 63);
    }

    #[test]
    fn cactus_height_is_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        for column in 0..16 {
            let mut chunk = Chunk::new(ChunkCoord::default());
            let height = place_cactus(&mut chunk, column, 70, 3, &mut rng);
            assert!(CACTUS_HEIGHT_RANGE.contains(&height));
            assert_eq!(count(&chunk, BlockType::CACTUS), height as usize);
        }
    }

    #[test]
    fn cactus_near_world_top_is_clipped() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        let mut rng = fastrand::Rng::with_seed(1);
        place_cactus(&mut chunk, 4, CHUNK_SIZE_Y as i32 - 1, 4, &mut rng);
        assert!(chunk.is_empty());
    }
}
