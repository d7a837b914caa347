//! Mesh generation for voxel rendering.
//!
//! This module converts a chunk's block grid into the list of visible faces,
//! one [`FaceInstance`] per face, ready for instanced drawing.
//!
//! # Algorithm
//! Meshing runs in two linear passes over the grid:
//! 1. **Visibility pass**: for every non-air cell and each of its six faces,
//!    set one bit in a dense mask of `CHUNK_VOLUME * 6` candidate slots when
//!    the face is visible (see [`culling`] for the rules).
//! 2. **Compaction pass**: allocate exactly `count_ones()` instances and emit
//!    them by walking the set bits.
//!
//! Slots are ordered `(x, y, z, face)`, so output order is stable for a given
//! grid and neighborhood. No container grows while faces are emitted.
//!
//! # Usage
//! ```
//! use voxel_world::engine_state::rendering::meshing::{build_chunk_mesh, ChunkNeighbors, MeshOptions};
//! use voxel_world::engine_state::voxels::block::block_type::BlockType;
//! use voxel_world::engine_state::voxels::chunk::{Chunk, ChunkCoord};
//!
//! let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
//! chunk.set(8, 40, 8, BlockType::STONE);
//!
//! let empty = Chunk::new(ChunkCoord::new(0, 0));
//! let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&empty), MeshOptions::default());
//! assert_eq!(mesh.len(), 6);
//! ```

use bitvec::prelude::*;
use cgmath::{Matrix4, Vector3};

use crate::engine_state::rendering::instance::{FaceInstance, InstanceLayout};
use crate::engine_state::voxels::{
    block::{block_side::BlockSide, Block},
    chunk::{Chunk, ChunkCoord, CHUNK_VOLUME},
};

pub mod culling;

pub use culling::{ChunkNeighbors, MeshOptions};

const SIDES: [BlockSide; 6] = [
    BlockSide::FRONT,
    BlockSide::BACK,
    BlockSide::LEFT,
    BlockSide::RIGHT,
    BlockSide::TOP,
    BlockSide::BOTTOM,
];

/// The visible faces of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    /// The chunk this mesh was built from
    pub coord: ChunkCoord,
    /// One entry per visible face, in `(x, y, z, face)` order
    pub instances: Vec<FaceInstance>,
}

impl ChunkMesh {
    pub fn empty(coord: ChunkCoord) -> Self {
        ChunkMesh {
            coord,
            instances: Vec::new(),
        }
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instance data as raw bytes, suitable for a GPU buffer write.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Instance data flattened into scalars using the given layout.
    pub fn pack(&self, layout: InstanceLayout) -> Vec<f32> {
        layout.pack(&self.instances)
    }
}

/// Builds the mesh of `chunk`.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `neighbors` - Fully generated neighbor chunks; missing ones hide boundary faces
/// * `options` - Face emission policy
///
/// # Returns
/// A `ChunkMesh` holding exactly the visible faces. An all-air chunk yields
/// an empty mesh.
pub fn build_chunk_mesh(chunk: &Chunk, neighbors: &ChunkNeighbors, options: MeshOptions) -> ChunkMesh {
    let visible_faces = visible_face_mask(chunk, neighbors, options);

    let mut instances = Vec::with_capacity(visible_faces.count_ones());
    let (origin_x, origin_z) = chunk.coord.world_origin();

    for slot in visible_faces.iter_ones() {
        let index = slot / 6;
        let side = SIDES[slot % 6];
        let (x, y, z) = Chunk::position_of(index);
        let position = Vector3::new(
            (origin_x + x as i32) as f32,
            y as f32,
            (origin_z + z as i32) as f32,
        );
        instances.push(face_instance(chunk.blocks()[index], side, position));
    }

    ChunkMesh {
        coord: chunk.coord,
        instances,
    }
}

/// First pass: one bit per `(cell, face)` slot, set when the face is visible.
fn visible_face_mask(chunk: &Chunk, neighbors: &ChunkNeighbors, options: MeshOptions) -> BitVec {
    let mut mask = bitvec![0; CHUNK_VOLUME * 6];

    for (position, block) in chunk.iter_blocks() {
        let base = Chunk::index(position.x, position.y, position.z) * 6;
        for side in SIDES {
            let neighbor = culling::neighbor_block(
                chunk, neighbors, options, position.x, position.y, position.z, side,
            );
            if culling::is_face_visible(*block, neighbor) {
                mask.set(base + side as usize, true);
            }
        }
    }

    mask
}

/// Builds the instance for one visible face of the block at world `position`.
fn face_instance(block: Block, side: BlockSide, mut position: Vector3<f32>) -> FaceInstance {
    let definition = block.definition();

    // Inset blocks pull their walls in; culling still sees a full cube.
    if definition.face_inset != 0.0 && side.is_horizontal() {
        position -= side.normal() * definition.face_inset;
    }

    let model = Matrix4::from_translation(position) * side.rotation();
    FaceInstance::new(
        definition.texture_offset(side),
        definition.overlay_offset(side),
        model,
        side.normal(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::{CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

    fn air(coord: ChunkCoord) -> Chunk {
        Chunk::new(coord)
    }

    fn fill_box(chunk: &mut Chunk, min: (usize, usize, usize), max: (usize, usize, usize), block_type: BlockType) {
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    chunk.set(x, y, z, block_type);
                }
            }
        }
    }

    #[test]
    fn empty_chunk_has_no_faces() {
        let chunk = air(ChunkCoord::default());
        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&chunk), MeshOptions::default());
        assert!(mesh.is_empty());
    }

    #[test]
    fn solid_cube_only_shows_its_shell() {
        let mut chunk = air(ChunkCoord::default());
        fill_box(&mut chunk, (4, 20, 4), (6, 22, 6), BlockType::STONE);
        let neighbor = air(ChunkCoord::default());

        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default());
        assert_eq!(mesh.len(), 6 * 9);
    }

    #[test]
    fn adjacent_water_hides_shared_faces() {
        let mut chunk = air(ChunkCoord::default());
        chunk.set(5, 30, 5, BlockType::WATER);
        chunk.set(6, 30, 5, BlockType::WATER);
        let neighbor = air(ChunkCoord::default());

        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default());
        assert_eq!(mesh.len(), 10);
    }

    #[test]
    fn stone_under_water_shows_its_top() {
        let mut chunk = air(ChunkCoord::default());
        chunk.set(5, 30, 5, BlockType::STONE);
        chunk.set(5, 31, 5, BlockType::WATER);
        let neighbor = air(ChunkCoord::default());

        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default());
        // Stone: all 6 faces. Water: all but its bottom.
        assert_eq!(mesh.len(), 11);
        let stone_top = mesh
            .instances
            .iter()
            .find(|instance| instance.normal == [0.0, 1.0, 0.0] && instance.translation()[1] == 30.0);
        assert!(stone_top.is_some());
    }

    #[test]
    fn faces_come_out_in_slot_order() {
        let mut chunk = air(ChunkCoord::default());
        chunk.set(1, 1, 1, BlockType::DIRT);
        chunk.set(0, 5, 2, BlockType::SAND);
        let neighbor = air(ChunkCoord::default());

        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default());
        assert_eq!(mesh.len(), 12);

        // First block in grid order is the sand at x = 0.
        assert_eq!(mesh.instances[0].tex_offset, [2.0, 1.0]);
        let normals: Vec<[f32; 3]> = mesh.instances[..6].iter().map(|i| i.normal).collect();
        let expected: Vec<[f32; 3]> = SIDES.iter().map(|side| side.normal().into()).collect();
        assert_eq!(normals, expected);
    }

    #[test]
    fn translations_are_world_positions() {
        let coord = ChunkCoord::new(-2, 3);
        let mut chunk = air(coord);
        chunk.set(4, 9, 7, BlockType::STONE);
        let neighbor = air(coord);

        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default());
        for instance in &mesh.instances {
            assert_eq!(instance.translation(), [-28.0, 9.0, 55.0]);
        }
    }

    #[test]
    fn missing_neighbors_hide_boundary_faces() {
        let mut chunk = air(ChunkCoord::default());
        chunk.set(0, 10, 0, BlockType::STONE);
        chunk.set(CHUNK_SIZE_X - 1, 10, CHUNK_SIZE_Z - 1, BlockType::STONE);

        let without = build_chunk_mesh(&chunk, &ChunkNeighbors::none(), MeshOptions::default());
        let neighbor = air(ChunkCoord::default());
        let with = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default());

        assert_eq!(without.len(), 8);
        assert_eq!(with.len(), 12);
    }

    #[test]
    fn top_of_world_is_open() {
        let mut chunk = air(ChunkCoord::default());
        chunk.set(3, CHUNK_SIZE_Y - 1, 3, BlockType::STONE);
        let neighbor = air(ChunkCoord::default());
        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default());
        assert_eq!(mesh.len(), 6);
    }

    #[test]
    fn compaction_matches_naive_enumeration() {
        let mut chunk = air(ChunkCoord::default());
        let mut rng = fastrand::Rng::with_seed(99);
        let palette = [BlockType::STONE, BlockType::WATER, BlockType::OAK_LEAVES, BlockType::CACTUS];
        for _ in 0..2000 {
            let (x, y, z) = (rng.usize(..CHUNK_SIZE_X), rng.usize(..24), rng.usize(..CHUNK_SIZE_Z));
            chunk.set(x, y, z, palette[rng.usize(..palette.len())]);
        }
        let mut neighbor = air(ChunkCoord::default());
        fill_box(&mut neighbor, (0, 0, 0), (15, 5, 15), BlockType::STONE);
        let neighbors = ChunkNeighbors {
            pos_x: Some(&neighbor),
            neg_z: Some(&neighbor),
            ..ChunkNeighbors::none()
        };
        let options = MeshOptions::default();

        let mut naive = Vec::new();
        for x in 0..CHUNK_SIZE_X {
            for y in 0..CHUNK_SIZE_Y {
                for z in 0..CHUNK_SIZE_Z {
                    let block = chunk.get(x, y, z);
                    if block.is_air() {
                        continue;
                    }
                    for side in SIDES {
                        let other = culling::neighbor_block(&chunk, &neighbors, options, x, y, z, side);
                        if culling::is_face_visible(block, other) {
                            naive.push(face_instance(block, side, Vector3::new(x as f32, y as f32, z as f32)));
                        }
                    }
                }
            }
        }

        let mesh = build_chunk_mesh(&chunk, &neighbors, options);
        assert_eq!(mesh.instances, naive);
    }
}
