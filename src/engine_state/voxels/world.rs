//! # World Module
//!
//! This module provides the `World` struct which manages the sparse collection
//! of chunks in the voxel world. It serves as the central coordinator for chunk
//! loading, unloading, and access.
//!
//! ## Architecture
//!
//! The world maps chunk coordinates to shared [`ChunkSlot`]s. A slot exists as
//! soon as a chunk is requested, but it holds no grid until generation
//! publishes one, and the mesh builder only sees it once the slot's
//! `generated` flag has been set. Until then the
//! chunk is "in flight": it is reserved in the map (so it is never scheduled
//! twice) yet [`World::neighbors_of`] treats it as absent.
//!
//! ## Thread Safety
//!
//! The world itself lives behind an `MtResource` lock, which workers only hold
//! long enough to insert, look up or clone slot handles. Slots are `Arc`-shared,
//! so evicting a chunk only drops the map's handle; a task that is still working
//! on the chunk keeps it alive until it finishes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::MtResource;
use crate::engine_state::voxels::chunk::{BoundingBox, Chunk, ChunkCoord};

/// A shared handle to a chunk slot.
pub type ChunkRef = Arc<ChunkSlot>;

/// Storage for one chunk plus its lifecycle state.
pub struct ChunkSlot {
    pub coord: ChunkCoord,
    /// Published with `Release` once terrain and features are complete.
    generated: AtomicBool,
    /// Last revision handed out to a mesh request for this chunk.
    mesh_revision: AtomicU64,
    /// The block grid, `None` while in flight. Written once, read afterwards.
    pub chunk: MtResource<Option<Chunk>>,
}

impl ChunkSlot {
    /// Creates an in-flight slot with no grid.
    pub fn new(coord: ChunkCoord) -> Self {
        ChunkSlot {
            coord,
            generated: AtomicBool::new(false),
            mesh_revision: AtomicU64::new(0),
            chunk: MtResource::new(None),
        }
    }

    /// Stores a fully generated grid and marks the slot as generated.
    ///
    /// The flag is set after the grid write lock is released, so any reader that
    /// observes `is_generated() == true` also observes the complete grid.
    pub fn publish_generated(&self, chunk: Chunk) {
        debug_assert_eq!(chunk.coord, self.coord);
        *self.chunk.get_mut() = Some(chunk);
        self.generated.store(true, Ordering::Release);
    }

    /// Whether terrain and features are complete.
    pub fn is_generated(&self) -> bool {
        self.generated.load(Ordering::Acquire)
    }

    /// Reserves the next mesh revision for this chunk.
    ///
    /// Revisions start at 1 and increase strictly.
    pub fn next_mesh_revision(&self) -> u64 {
        self.mesh_revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The most recently reserved mesh revision, 0 if none.
    pub fn current_mesh_revision(&self) -> u64 {
        self.mesh_revision.load(Ordering::Acquire)
    }
}

/// The generated cardinal neighbors of a chunk.
///
/// A `None` entry means the neighbor is unloaded or still being generated.
#[derive(Clone, Default)]
pub struct NeighborRefs {
    pub pos_x: Option<ChunkRef>,
    pub neg_x: Option<ChunkRef>,
    pub pos_z: Option<ChunkRef>,
    pub neg_z: Option<ChunkRef>,
}

impl NeighborRefs {
    /// Iterates the neighbors that are present.
    pub fn iter(&self) -> impl Iterator<Item = &ChunkRef> {
        [&self.pos_x, &self.neg_x, &self.pos_z, &self.neg_z]
            .into_iter()
            .flatten()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::voxels::chunk::ChunkCoord;
/// use voxel_world::engine_state::voxels::world::World;
///
/// let mut world = World::new();
/// let (slot, newly_created) = world.ensure_chunk_loaded(ChunkCoord::new(0, 0));
/// assert!(newly_created);
/// assert!(!slot.is_generated());
///
/// // Requesting the same chunk again returns the same slot.
/// let (_, newly_created) = world.ensure_chunk_loaded(ChunkCoord::new(0, 0));
/// assert!(!newly_created);
/// assert_eq!(world.len(), 1);
/// ```
#[derive(Default)]
pub struct World {
    /// A mapping from chunk coordinates to chunk slots.
    chunks: HashMap<ChunkCoord, ChunkRef>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
        }
    }

    /// Returns the slot for `coord`, reserving an in-flight slot if the chunk
    /// is not loaded yet.
    ///
    /// # Returns
    /// The slot, and `true` if it was created by this call. The caller that
    /// receives `true` is responsible for scheduling the chunk's generation.
    pub fn ensure_chunk_loaded(&mut self, coord: ChunkCoord) -> (ChunkRef, bool) {
        if let Some(slot) = self.chunks.get(&coord) {
            return (slot.clone(), false);
        }

        let slot = Arc::new(ChunkSlot::new(coord));
        self.chunks.insert(coord, slot.clone());
        (slot, true)
    }

    /// Retrieves the slot at the given coordinates, generated or not.
    pub fn get_chunk_at(&self, coord: ChunkCoord) -> Option<ChunkRef> {
        self.chunks.get(&coord).cloned()
    }

    /// Retrieves the slot at the given coordinates only if it is generated.
    pub fn get_generated_chunk_at(&self, coord: ChunkCoord) -> Option<ChunkRef> {
        self.chunks
            .get(&coord)
            .filter(|slot| slot.is_generated())
            .cloned()
    }

    /// The four edge-sharing neighbors of `coord` that are fully generated.
    pub fn neighbors_of(&self, coord: ChunkCoord) -> NeighborRefs {
        NeighborRefs {
            pos_x: self.get_generated_chunk_at(coord.offset(1, 0)),
            neg_x: self.get_generated_chunk_at(coord.offset(-1, 0)),
            pos_z: self.get_generated_chunk_at(coord.offset(0, 1)),
            neg_z: self.get_generated_chunk_at(coord.offset(0, -1)),
        }
    }

    /// Removes every chunk farther than `radius` (square distance) from `center`.
    ///
    /// # Returns
    /// The coordinates that were removed, sorted.
    pub fn evict_chunks_outside_radius(&mut self, center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
        let mut evicted: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|coord| coord.square_distance(center) > radius)
            .copied()
            .collect();
        evicted.sort();

        for coord in &evicted {
            self.chunks.remove(coord);
        }

        evicted
    }

    /// World-space bounds of a loaded chunk, generated or not.
    pub fn chunk_bounding_box(&self, coord: ChunkCoord) -> Option<BoundingBox> {
        self.chunks.get(&coord).map(|slot| slot.coord.bounding_box())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of loaded chunks whose generation has completed.
    pub fn generated_count(&self) -> usize {
        self.chunks.values().filter(|slot| slot.is_generated()).count()
    }

    /// Coordinates of all loaded chunks, in no particular order.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }
}
