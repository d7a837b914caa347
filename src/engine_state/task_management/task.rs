//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work asynchronously across multiple threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//! - `TaskContext`: The shared engine state results are applied to
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread
//! 5. The result can update shared state and spawn follow-up tasks

use std::sync::Arc;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{MeshManager, MeshOptions},
        voxels::{generation::TerrainGenerator, world::World},
    },
};

/// Shared engine state handed to task results on the main thread.
///
/// Every field is a cheap handle, so tasks clone what they need out of it
/// when they are created.
#[derive(Clone)]
pub struct TaskContext {
    /// The chunk store
    pub world: MtResource<World>,
    /// The mesh store
    pub mesh_manager: MtResource<MeshManager>,
    /// Seeded terrain generator shared by all generation tasks
    pub generator: Arc<TerrainGenerator>,
    /// Face emission policy used by every mesh task
    pub mesh_options: MeshOptions,
}

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks should own all the data they need (usually `Arc` handles) so they
/// can be moved to a worker thread.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// This runs on a worker thread. It must not hold the world lock while
    /// doing heavy work.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// A trait representing the result of processing a `Task`.
pub trait TaskResult: Send {
    /// Handles the result of a completed task on the main thread.
    ///
    /// # Arguments
    /// * `context` - Shared engine state
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, context: &TaskContext) -> Vec<Box<dyn Task + Send>>;
}

/// Result produced when a task panicked on its worker.
pub struct FailedTaskResult {
    pub message: String,
}

impl TaskResult for FailedTaskResult {
    fn handle_result(self: Box<Self>, _context: &TaskContext) -> Vec<Box<dyn Task + Send>> {
        log::error!("Task panicked on worker: {}", self.message);
        Vec::new()
    }
}
