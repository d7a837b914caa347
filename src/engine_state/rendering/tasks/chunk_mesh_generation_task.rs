//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which builds the face
//! instance buffer of one chunk against whichever of its neighbors are
//! generated at the time the task runs.

use log::{debug, trace};
use std::sync::Arc;
use web_time::Instant;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{build_chunk_mesh, ChunkMesh, ChunkNeighbors, MeshOptions},
        task_management::task::{FailedTaskResult, Task, TaskContext, TaskResult},
        voxels::world::{ChunkRef, World},
    },
};

/// A task that generates mesh data for a chunk in a background thread.
///
/// This task is responsible for:
/// 1. Collecting handles to the chunk's generated neighbors
/// 2. Building the chunk's visible faces
/// 3. Returning the mesh, tagged with its revision, to the mesh store
pub struct ChunkMeshGenerationTask {
    /// Used only to look up neighbor handles
    world: MtResource<World>,
    /// The chunk to mesh
    slot: ChunkRef,
    /// Revision reserved for this request
    revision: u64,
    /// Face emission policy
    options: MeshOptions,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task, reserving the chunk's next
    /// mesh revision.
    ///
    /// # Arguments
    /// * `context` - Shared engine state
    /// * `slot` - The chunk to mesh; must already be generated
    pub fn new(context: &TaskContext, slot: ChunkRef) -> Self {
        let revision = slot.next_mesh_revision();
        ChunkMeshGenerationTask {
            world: context.world.clone(),
            slot,
            revision,
            options: context.mesh_options,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    /// Builds the mesh.
    ///
    /// The world lock is held only while neighbor handles are cloned. Chunk
    /// grids are read-locked while meshing; generated grids are never written
    /// again, so this never waits on a writer.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let neighbor_refs = self.world.get().neighbors_of(self.slot.coord);

        let grid = self.slot.chunk.get();
        let Some(chunk) = grid.as_ref() else {
            return Box::new(FailedTaskResult {
                message: format!("chunk {:?} was meshed before it was generated", self.slot.coord),
            });
        };
        let pos_x = neighbor_refs.pos_x.as_ref().map(|slot| slot.chunk.get());
        let neg_x = neighbor_refs.neg_x.as_ref().map(|slot| slot.chunk.get());
        let pos_z = neighbor_refs.pos_z.as_ref().map(|slot| slot.chunk.get());
        let neg_z = neighbor_refs.neg_z.as_ref().map(|slot| slot.chunk.get());

        let neighbors = ChunkNeighbors {
            pos_x: pos_x.as_deref().and_then(Option::as_ref),
            neg_x: neg_x.as_deref().and_then(Option::as_ref),
            pos_z: pos_z.as_deref().and_then(Option::as_ref),
            neg_z: neg_z.as_deref().and_then(Option::as_ref),
        };
        let mesh = build_chunk_mesh(chunk, &neighbors, self.options);

        debug!(
            "Meshed chunk {:?} revision {} ({} faces, {} neighbors) in {:?}",
            self.slot.coord,
            self.revision,
            mesh.len(),
            neighbor_refs.count(),
            start.elapsed()
        );

        Box::new(ChunkMeshGenerationTaskResult {
            slot: self.slot.clone(),
            revision: self.revision,
            mesh,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    slot: ChunkRef,
    revision: u64,
    mesh: ChunkMesh,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Hands the mesh to the mesh store, unless the chunk has been evicted
    /// since the task was scheduled.
    fn handle_result(self: Box<Self>, context: &TaskContext) -> Vec<Box<dyn Task + Send>> {
        let still_loaded = context
            .world
            .get()
            .get_chunk_at(self.slot.coord)
            .is_some_and(|current| Arc::ptr_eq(&current, &self.slot));

        if still_loaded {
            context.mesh_manager.get_mut().submit(self.revision, self.mesh);
        } else {
            trace!("Discarding mesh of evicted chunk {:?}", self.slot.coord);
        }

        Vec::new()
    }
}
