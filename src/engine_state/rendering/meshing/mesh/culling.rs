//! Face visibility rules.
//!
//! A face is emitted when the cell it looks at is transparent, unless both
//! cells hold the same liquid. Cells outside the chunk are resolved through the
//! cardinal neighbor chunks; an unknown neighbor hides the face.

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, Block},
    chunk::{Chunk, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z},
};

/// Read-only views of the four edge-sharing neighbor chunks.
///
/// `None` means the neighbor is not loaded or not fully generated yet.
#[derive(Copy, Clone, Default)]
pub struct ChunkNeighbors<'a> {
    pub pos_x: Option<&'a Chunk>,
    pub neg_x: Option<&'a Chunk>,
    pub pos_z: Option<&'a Chunk>,
    pub neg_z: Option<&'a Chunk>,
}

impl<'a> ChunkNeighbors<'a> {
    /// No neighbors at all.
    pub fn none() -> Self {
        ChunkNeighbors::default()
    }

    /// The same chunk on all four sides.
    pub fn uniform(chunk: &'a Chunk) -> Self {
        ChunkNeighbors {
            pos_x: Some(chunk),
            neg_x: Some(chunk),
            pos_z: Some(chunk),
            neg_z: Some(chunk),
        }
    }
}

/// Knobs that change which faces are emitted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshOptions {
    /// Treat the cell below y = 0 as solid, hiding the world's bottom faces.
    pub cull_world_floor: bool,
}

/// Looks up the block on the other side of `side` from local `(x, y, z)`.
///
/// # Returns
/// - `Some(block)` when the neighboring cell is known (above the world is air)
/// - `None` when it must be treated as solid: the neighbor chunk is missing,
///   or the cell is under the world floor and the floor is culled
#[inline]
pub fn neighbor_block(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors,
    options: MeshOptions,
    x: usize,
    y: usize,
    z: usize,
    side: BlockSide,
) -> Option<Block> {
    let (dx, dy, dz) = side.neighbor_offset();
    let nx = x as i32 + dx;
    let ny = y as i32 + dy;
    let nz = z as i32 + dz;

    if ny < 0 {
        return if options.cull_world_floor {
            None
        } else {
            Some(Block::AIR)
        };
    }
    if ny >= CHUNK_SIZE_Y as i32 {
        return Some(Block::AIR);
    }
    let ny = ny as usize;

    if nx < 0 {
        neighbors.neg_x.map(|n| n.get(CHUNK_SIZE_X - 1, ny, z))
    } else if nx >= CHUNK_SIZE_X as i32 {
        neighbors.pos_x.map(|n| n.get(0, ny, z))
    } else if nz < 0 {
        neighbors.neg_z.map(|n| n.get(x, ny, CHUNK_SIZE_Z - 1))
    } else if nz >= CHUNK_SIZE_Z as i32 {
        neighbors.pos_z.map(|n| n.get(x, ny, 0))
    } else {
        Some(chunk.get(nx as usize, ny, nz as usize))
    }
}

/// Whether a face of `block` is visible against `neighbor`.
#[inline]
pub fn is_face_visible(block: Block, neighbor: Option<Block>) -> bool {
    let Some(neighbor) = neighbor else {
        return false;
    };
    let neighbor_definition = neighbor.definition();
    if !neighbor_definition.is_transparent {
        return false;
    }
    !(neighbor_definition.is_liquid && neighbor.block_type == block.block_type)
}
