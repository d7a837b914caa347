//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a dense 16x128x16 grid of blocks
//! addressed by a horizontal chunk coordinate. Chunks are the unit of
//! generation, storage, meshing and eviction.
//!
//! ## Storage Layout
//!
//! Blocks are stored in a flat vector indexed as
//! `x * (SIZE_Y * SIZE_Z) + y * SIZE_Z + z`. Walking the vector front to back
//! therefore visits cells in `(x, y, z)` order, which is the order the mesh
//! builder emits faces in.
//!
//! Every cell costs `size_of::<Block>()` bytes (one), so a full chunk is 32 KiB
//! regardless of content. Lookups and writes are O(1).

use cgmath::Point3;

use super::block::block_type::BlockType;
use super::block::Block;

pub mod chunk_iteration;

/// Width of a chunk along X, in blocks.
pub const CHUNK_SIZE_X: usize = 16;
/// Height of a chunk along Y, in blocks. Also the vertical extent of the world.
pub const CHUNK_SIZE_Y: usize = 128;
/// Depth of a chunk along Z, in blocks.
pub const CHUNK_SIZE_Z: usize = 16;
/// Number of cells in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z;

/// Horizontal position of a chunk, in chunk units.
///
/// The world block position of a local cell is `coord * size + local`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// The chunk containing the given world-space position.
    pub fn containing(position: Point3<f32>) -> Self {
        ChunkCoord {
            x: (position.x / CHUNK_SIZE_X as f32).floor() as i32,
            z: (position.z / CHUNK_SIZE_Z as f32).floor() as i32,
        }
    }

    /// World block coordinates of the chunk's (0, 0, 0) cell.
    pub fn world_origin(self) -> (i32, i32) {
        (self.x * CHUNK_SIZE_X as i32, self.z * CHUNK_SIZE_Z as i32)
    }

    /// Returns the coordinate offset by `(dx, dz)` chunks.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        ChunkCoord::new(self.x + dx, self.z + dz)
    }

    /// The four edge-sharing neighbors, in the order +X, -X, +Z, -Z.
    pub fn cardinal_neighbors(self) -> [ChunkCoord; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    /// World-space bounds of the chunk column at this coordinate.
    ///
    /// Block centers sit on integer coordinates, so the box extends half a
    /// block past the outermost cell centers.
    pub fn bounding_box(self) -> BoundingBox {
        let (origin_x, origin_z) = self.world_origin();
        BoundingBox {
            min: Point3::new(origin_x as f32 - 0.5, -0.5, origin_z as f32 - 0.5),
            max: Point3::new(
                (origin_x + CHUNK_SIZE_X as i32) as f32 - 0.5,
                CHUNK_SIZE_Y as f32 - 0.5,
                (origin_z + CHUNK_SIZE_Z as i32) as f32 - 0.5,
            ),
        }
    }

    /// Chebyshev distance in chunk units, the metric used for square radii.
    pub fn square_distance(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Axis-aligned world-space bounds of a chunk, used for frustum culling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// A dense 16x128x16 column of voxel blocks.
///
/// A chunk starts out as all air, is filled once by the terrain generator and
/// feature placer, and is then read (possibly many times) by the mesh builder.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub coord: ChunkCoord,

    /// One entry per cell, see the module docs for the index layout.
    blocks: Vec<Block>,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    ///
    /// # Arguments
    /// * `coord` - The chunk coordinates of the new chunk
    pub fn new(coord: ChunkCoord) -> Self {
        Chunk {
            coord,
            blocks: vec![Block::AIR; CHUNK_VOLUME],
        }
    }

    /// Creates a chunk from an already laid out grid.
    ///
    /// # Panics
    /// Panics if `blocks` does not hold exactly [`CHUNK_VOLUME`] cells.
    pub fn from_blocks(coord: ChunkCoord, blocks: Vec<Block>) -> Self {
        assert_eq!(
            blocks.len(),
            CHUNK_VOLUME,
            "chunk grid at {:?} must have {} cells, got {}",
            coord,
            CHUNK_VOLUME,
            blocks.len()
        );
        Chunk { coord, blocks }
    }

    /// Flat index of a local cell.
    #[inline]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        x * (CHUNK_SIZE_Y * CHUNK_SIZE_Z) + y * CHUNK_SIZE_Z + z
    }

    /// Inverse of [`Chunk::index`].
    #[inline]
    pub const fn position_of(index: usize) -> (usize, usize, usize) {
        let x = index / (CHUNK_SIZE_Y * CHUNK_SIZE_Z);
        let y = (index / CHUNK_SIZE_Z) % CHUNK_SIZE_Y;
        let z = index % CHUNK_SIZE_Z;
        (x, y, z)
    }

    /// Whether signed local coordinates fall inside the grid.
    #[inline]
    pub fn contains(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_SIZE_X as i32).contains(&x)
            && (0..CHUNK_SIZE_Y as i32).contains(&y)
            && (0..CHUNK_SIZE_Z as i32).contains(&z)
    }

    /// Returns the block at the given local position.
    ///
    /// # Panics
    /// Panics if the position is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        debug_assert!(x < CHUNK_SIZE_X && y < CHUNK_SIZE_Y && z < CHUNK_SIZE_Z);
        self.blocks[Self::index(x, y, z)]
    }

    pub fn get_block_type(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.get(x, y, z).block_type()
    }

    /// Sets the block at the given local position.
    ///
    /// # Panics
    /// Panics if the position is outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        debug_assert!(x < CHUNK_SIZE_X && y < CHUNK_SIZE_Y && z < CHUNK_SIZE_Z);
        self.blocks[Self::index(x, y, z)] = Block::new(block_type);
    }

    /// Sets a block if the signed position is inside the grid.
    ///
    /// # Returns
    /// `true` if the block was written, `false` if the position was skipped.
    pub fn set_if_in_bounds(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        if !Self::contains(x, y, z) {
            return false;
        }
        self.set(x as usize, y as usize, z as usize, block_type);
        true
    }

    /// Sets a block if the signed position is inside the grid and holds air.
    pub fn set_if_vacant(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        if !Self::contains(x, y, z) || !self.get(x as usize, y as usize, z as usize).is_air() {
            return false;
        }
        self.set(x as usize, y as usize, z as usize, block_type);
        true
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The grid viewed as raw bytes, one per cell.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// Number of non-air cells.
    pub fn solid_block_count(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_air()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|block| block.is_air())
    }

    /// World-space bounds of the chunk.
    pub fn bounding_box(&self) -> BoundingBox {
        self.coord.bounding_box()
    }

    /// Iterates all non-air cells in `(x, y, z)` order.
    pub fn iter_blocks(&self) -> chunk_iteration::ChunkBlockIterator<'_> {
        chunk_iteration::ChunkBlockIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_air() {
        let chunk = Chunk::new(ChunkCoord::new(3, -2));
        assert!(chunk.is_empty());
        assert_eq!(chunk.blocks().len(), CHUNK_VOLUME);
        assert_eq!(chunk.get_block_type(15, 127, 15), BlockType::AIR);
    }

    #[test]
    fn index_round_trips_through_position_of() {
        for &(x, y, z) in &[(0, 0, 0), (15, 127, 15), (3, 64, 9), (0, 1, 0)] {
            assert_eq!(Chunk::position_of(Chunk::index(x, y, z)), (x, y, z));
        }
        assert_eq!(Chunk::index(0, 0, 1), 1);
        assert_eq!(Chunk::index(0, 1, 0), CHUNK_SIZE_Z);
        assert_eq!(Chunk::index(1, 0, 0), CHUNK_SIZE_Y * CHUNK_SIZE_Z);
    }

    #[test]
    fn set_if_in_bounds_skips_outside_cells() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        assert!(chunk.set_if_in_bounds(0, 0, 0, BlockType::STONE));
        assert!(!chunk.set_if_in_bounds(-1, 0, 0, BlockType::STONE));
        assert!(!chunk.set_if_in_bounds(0, CHUNK_SIZE_Y as i32, 0, BlockType::STONE));
        assert!(!chunk.set_if_in_bounds(0, 0, CHUNK_SIZE_Z as i32, BlockType::STONE));
        assert_eq!(chunk.solid_block_count(), 1);
    }

    #[test]
    fn set_if_vacant_keeps_existing_blocks() {
        let mut chunk = Chunk::new(ChunkCoord::default());
        chunk.set(1, 1, 1, BlockType::DIRT);
        assert!(!chunk.set_if_vacant(1, 1, 1, BlockType::OAK_LEAVES));
        assert!(chunk.set_if_vacant(1, 2, 1, BlockType::OAK_LEAVES));
        assert!(!chunk.set_if_vacant(1, -1, 1, BlockType::OAK_LEAVES));
        assert_eq!(chunk.get_block_type(1, 1, 1), BlockType::DIRT);
    }

    #[test]
    #[should_panic(expected = "must have")]
    fn from_blocks_rejects_wrong_length() {
        Chunk::from_blocks(ChunkCoord::default(), vec![Block::AIR; 10]);
    }

    #[test]
    fn coord_of_negative_positions() {
        assert_eq!(
            ChunkCoord::containing(Point3::new(-0.1, 70.0, 15.9)),
            ChunkCoord::new(-1, 0)
        );
        assert_eq!(ChunkCoord::new(-1, 2).world_origin(), (-16, 32));
        assert_eq!(ChunkCoord::new(0, 0).square_distance(ChunkCoord::new(-3, 2)), 3);
    }

    #[test]
    fn bounding_box_spans_the_chunk() {
        let chunk = Chunk::new(ChunkCoord::new(1, -1));
        let bounds = chunk.bounding_box();
        assert_eq!(bounds.min, Point3::new(15.5, -0.5, -16.5));
        assert_eq!(bounds.max, Point3::new(31.5, 127.5, -0.5));
        assert_eq!(bounds, ChunkCoord::new(1, -1).bounding_box());
    }
}
