//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which fills an in-flight
//! chunk slot with terrain and features on a worker thread. It is scheduled
//! once per chunk, when the chunk first enters the render distance.

use log::debug;
use web_time::Instant;

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::{generation::TerrainGenerator, world::ChunkRef},
};
use std::sync::Arc;

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Generating terrain and features for the slot's coordinate
/// 2. Publishing the grid and the slot's `generated` flag
/// 3. Scheduling mesh generation for the chunk and its generated neighbors
pub struct ChunkGenerationTask {
    /// Shared seeded generator
    generator: Arc<TerrainGenerator>,
    /// The in-flight slot to fill
    slot: ChunkRef,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The world's terrain generator
    /// * `slot` - The slot reserved for the chunk in the world
    pub fn new(generator: Arc<TerrainGenerator>, slot: ChunkRef) -> Self {
        ChunkGenerationTask { generator, slot }
    }
}

impl Task for ChunkGenerationTask {
    /// Generates the chunk without holding any world lock, then publishes it.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let chunk = self.generator.generate_chunk(self.slot.coord);
        let solid_blocks = chunk.solid_block_count();
        self.slot.publish_generated(chunk);

        debug!(
            "Generated chunk {:?} ({} solid blocks) in {:?}",
            self.slot.coord,
            solid_blocks,
            start.elapsed()
        );

        Box::new(ChunkGenerationTaskResult {
            slot: self.slot.clone(),
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    /// The freshly generated slot
    slot: ChunkRef,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Schedules a mesh of the new chunk and a remesh of every generated
    /// cardinal neighbor, whose boundary faces may have changed.
    ///
    /// Nothing is scheduled if the chunk was evicted while generating.
    fn handle_result(self: Box<Self>, context: &TaskContext) -> Vec<Box<dyn Task + Send>> {
        let world = context.world.get();

        let still_loaded = world
            .get_chunk_at(self.slot.coord)
            .is_some_and(|current| Arc::ptr_eq(&current, &self.slot));
        if !still_loaded {
            debug!("Chunk {:?} was evicted while generating", self.slot.coord);
            return Vec::new();
        }

        let neighbors = world.neighbors_of(self.slot.coord);
        drop(world);

        let mut tasks: Vec<Box<dyn Task + Send>> = Vec::with_capacity(1 + neighbors.count());
        tasks.push(Box::new(ChunkMeshGenerationTask::new(context, self.slot.clone())));
        for neighbor in neighbors.iter() {
            tasks.push(Box::new(ChunkMeshGenerationTask::new(context, neighbor.clone())));
        }
        tasks
    }
}
