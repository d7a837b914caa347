//! # Chunk Iteration Module
//!
//! This module provides an iterator for traversing all non-air blocks in a
//! chunk, together with their local positions.
//!
//! The iterator walks the flat grid front to back, so blocks come out in the
//! same `(x, y, z)` order the mesh builder uses.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::Chunk;

/// An iterator over all non-air blocks in a chunk.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next flat index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first cell.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }

    /// Gets the next non-air block in the chunk along with its position.
    ///
    /// # Returns
    /// - `Some((position, block))` if another non-air block is found
    /// - `None` once the whole grid has been scanned
    pub fn get_next_block(&mut self) -> Option<(Point3<usize>, &'a Block)> {
        let blocks = self.chunk_ref.blocks();

        while self.current_offset < blocks.len() {
            let offset = self.current_offset;
            self.current_offset += 1;

            let block = &blocks[offset];
            if !block.is_air() {
                let (x, y, z) = Chunk::position_of(offset);
                return Some((Point3::new(x, y, z), block));
            }
        }

        None
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (Point3<usize>, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_block()
    }
}
