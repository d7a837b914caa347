//! Mesh generation and management for voxel rendering.
//!
//! This module handles the conversion of voxel data into GPU-friendly face
//! instance buffers and keeps the newest buffer of every chunk around for the
//! renderer.
//!
//! # Architecture
//! - `mesh/`: the face culling mesh builder
//! - `MeshManager`: the mesh store, which accepts finished meshes from worker
//!   tasks, discards stale ones and queues changed chunks for upload
//!
//! # Revisions
//! Every mesh request carries a revision taken from its chunk slot. A chunk
//! can be remeshed several times in a row (once when it is generated, then
//! again when each neighbor arrives), and those tasks may finish in any order.
//! The store only ever replaces a mesh with one of a higher revision.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use log::{trace, warn};
use lru::LruCache;

use crate::engine_state::voxels::chunk::ChunkCoord;

mod mesh;

pub use mesh::*;

/// A mesh together with the revision it was built for.
#[derive(Debug, Clone)]
pub struct StoredMesh {
    pub revision: u64,
    pub mesh: Arc<ChunkMesh>,
}

/// A chunk whose instance buffer changed since the last upload.
#[derive(Debug, Clone)]
pub struct MeshUpload {
    pub coord: ChunkCoord,
    pub revision: u64,
    pub mesh: Arc<ChunkMesh>,
}

/// Central store for finished chunk meshes.
///
/// # Memory Management
///
/// Meshes are kept in an LRU cache bounded by the configured capacity. When the
/// cache is full the least recently meshed chunk loses its mesh; a warning is
/// logged because the capacity should exceed the number of loaded chunks.
pub struct MeshManager {
    /// LRU cache of the newest mesh per chunk
    least_recently_meshed_chunks: LruCache<ChunkCoord, StoredMesh>,
    /// Chunks whose mesh changed and hasn't been taken for upload yet
    pending_uploads: BTreeSet<ChunkCoord>,
}

impl MeshManager {
    /// Creates an empty mesh store.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of chunk meshes kept at once
    pub fn new(capacity: NonZeroUsize) -> Self {
        MeshManager {
            least_recently_meshed_chunks: LruCache::new(capacity),
            pending_uploads: BTreeSet::new(),
        }
    }

    /// Offers a finished mesh to the store.
    ///
    /// # Returns
    /// `true` if the mesh replaced the stored one, `false` if it was stale.
    pub fn submit(&mut self, revision: u64, mesh: ChunkMesh) -> bool {
        let coord = mesh.coord;

        if let Some(stored) = self.least_recently_meshed_chunks.peek(&coord) {
            if stored.revision >= revision {
                trace!(
                    "Dropping stale mesh for {:?}: revision {} <= {}",
                    coord,
                    revision,
                    stored.revision
                );
                return false;
            }
        }

        let stored = StoredMesh {
            revision,
            mesh: Arc::new(mesh),
        };
        if let Some((evicted, _)) = self.least_recently_meshed_chunks.push(coord, stored) {
            if evicted != coord {
                warn!("Mesh cache full, dropped mesh of chunk {:?}", evicted);
                self.pending_uploads.remove(&evicted);
            }
        }
        self.pending_uploads.insert(coord);
        true
    }

    /// Whether a mesh is stored for the chunk.
    pub fn is_chunk_meshed(&self, coord: ChunkCoord) -> bool {
        self.least_recently_meshed_chunks.contains(&coord)
    }

    /// The stored mesh of a chunk, if any.
    pub fn get(&self, coord: ChunkCoord) -> Option<&StoredMesh> {
        self.least_recently_meshed_chunks.peek(&coord)
    }

    /// Drains the chunks whose mesh changed since the last call.
    ///
    /// Each changed chunk appears once with its newest mesh, in coordinate
    /// order.
    pub fn take_pending_uploads(&mut self) -> Vec<MeshUpload> {
        let pending = std::mem::take(&mut self.pending_uploads);
        pending
            .into_iter()
            .filter_map(|coord| {
                self.least_recently_meshed_chunks
                    .peek(&coord)
                    .map(|stored| MeshUpload {
                        coord,
                        revision: stored.revision,
                        mesh: stored.mesh.clone(),
                    })
            })
            .collect()
    }

    /// Forgets the mesh of an evicted chunk.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<StoredMesh> {
        self.pending_uploads.remove(&coord);
        self.least_recently_meshed_chunks.pop(&coord)
    }

    /// Number of chunks with a stored mesh.
    pub fn len(&self) -> usize {
        self.least_recently_meshed_chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.least_recently_meshed_chunks.is_empty()
    }

    /// Total number of face instances across all stored meshes.
    pub fn total_instances(&self) -> usize {
        self.least_recently_meshed_chunks
            .iter()
            .map(|(_, stored)| stored.mesh.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::Chunk;

    fn mesh_with_faces(coord: ChunkCoord, blocks: usize) -> ChunkMesh {
        let mut chunk = Chunk::new(coord);
        for i in 0..blocks {
            chunk.set(i * 2, 10, 0, BlockType::STONE);
        }
        let neighbor = Chunk::new(coord);
        build_chunk_mesh(&chunk, &ChunkNeighbors::uniform(&neighbor), MeshOptions::default())
    }

    fn manager(capacity: usize) -> MeshManager {
        MeshManager::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn stale_meshes_are_rejected() {
        let mut meshes = manager(8);
        let coord = ChunkCoord::new(1, 1);

        assert!(meshes.submit(2, mesh_with_faces(coord, 2)));
        assert!(!meshes.submit(1, mesh_with_faces(coord, 1)));
        assert!(!meshes.submit(2, mesh_with_faces(coord, 1)));

        let stored = meshes.get(coord).unwrap();
        assert_eq!(stored.revision, 2);
        assert_eq!(stored.mesh.len(), 12);
    }

    #[test]
    fn pending_uploads_are_deduplicated_and_drained() {
        let mut meshes = manager(8);
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(0, 1);

        meshes.submit(1, mesh_with_faces(b, 1));
        meshes.submit(1, mesh_with_faces(a, 1));
        meshes.submit(2, mesh_with_faces(a, 2));

        let uploads = meshes.take_pending_uploads();
        let coords: Vec<_> = uploads.iter().map(|u| (u.coord, u.revision)).collect();
        assert_eq!(coords, vec![(a, 2), (b, 1)]);
        assert!(meshes.take_pending_uploads().is_empty());
        assert_eq!(meshes.total_instances(), 12 + 6);
    }

    #[test]
    fn removal_and_capacity() {
        let mut meshes = manager(2);
        meshes.submit(1, mesh_with_faces(ChunkCoord::new(0, 0), 1));
        meshes.submit(1, mesh_with_faces(ChunkCoord::new(1, 0), 1));
        meshes.submit(1, mesh_with_faces(ChunkCoord::new(2, 0), 1));

        assert_eq!(meshes.len(), 2);
        assert!(!meshes.is_chunk_meshed(ChunkCoord::new(0, 0)));

        assert!(meshes.remove(ChunkCoord::new(1, 0)).is_some());
        assert_eq!(meshes.len(), 1);
        let uploads = meshes.take_pending_uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].coord, ChunkCoord::new(2, 0));
    }
}
