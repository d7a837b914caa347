//! # Engine State Module
//!
//! The core engine module that owns the voxel world and drives its lifecycle.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `rendering` - Face culling mesh builder, instance layout and mesh store
//! * `settings` - Runtime configuration
//! * `task_management` - Worker pool running generation and meshing tasks
//! * `voxels` - Blocks, chunks, terrain generation and the chunk store
//!
//! ## Lifecycle
//!
//! `EngineState::new` builds every subsystem from a [`WorldSettings`]. Each
//! frame the embedding application calls `update` with the camera position,
//! which streams chunks in and out around the camera's chunk and applies any
//! finished work, then drains `take_pending_uploads` to copy changed instance
//! buffers to the GPU. `shutdown` stops and joins every worker.

use std::sync::Arc;
use std::time::Duration;

use cgmath::Point3;
use log::{debug, info};
use web_time::Instant;

use rendering::meshing::{MeshManager, MeshUpload};
use settings::WorldSettings;
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    chunk::{BoundingBox, ChunkCoord},
    generation::TerrainGenerator,
    tasks::chunk_generation_task::ChunkGenerationTask,
    world::World,
};

use crate::core::MtResource;

pub mod rendering;
pub mod settings;
pub mod task_management;
pub mod voxels;

/// A snapshot of the engine's workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub loaded_chunks: usize,
    pub generated_chunks: usize,
    pub meshed_chunks: usize,
    pub total_faces: usize,
    pub queued_tasks: usize,
    pub in_flight_tasks: usize,
}

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point3;
/// use voxel_world::engine_state::{settings::WorldSettings, EngineState};
///
/// let mut engine_state = EngineState::new(WorldSettings::default())?;
///
/// // Main loop
/// loop {
///     engine_state.update(Point3::new(0.0, 80.0, 0.0));
///     for upload in engine_state.take_pending_uploads() {
///         // Copy upload.mesh.as_bytes() into the chunk's instance buffer.
///     }
/// #   break;
/// }
///
/// engine_state.shutdown();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct EngineState {
    /// Configuration the engine was built with
    pub settings: WorldSettings,
    /// The voxel world containing all chunk data
    pub world: MtResource<World>,
    /// Newest mesh of every meshed chunk
    pub mesh_manager: MtResource<MeshManager>,
    /// Task manager for asynchronous operations
    pub task_manager: TaskManager,
    /// Seeded generator shared by all generation tasks
    generator: Arc<TerrainGenerator>,
    /// Chunk the world was last streamed around
    current_center_chunk: Option<ChunkCoord>,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized.
    ///
    /// No chunk is loaded until the first `update`.
    ///
    /// # Errors
    /// Returns an error if the settings fail [`WorldSettings::validate`].
    pub fn new(settings: WorldSettings) -> anyhow::Result<Self> {
        settings.validate()?;

        let world = MtResource::new(World::new());
        let mesh_manager = MtResource::new(MeshManager::new(settings.mesh_capacity()));
        let generator = Arc::new(TerrainGenerator::new(settings.seed));

        let context = TaskContext {
            world: world.clone(),
            mesh_manager: mesh_manager.clone(),
            generator: generator.clone(),
            mesh_options: settings.mesh_options(),
        };
        let task_manager = TaskManager::new(settings.effective_worker_count(), context);

        info!(
            "Engine started with seed {} (render distance {}, cleanup radius {})",
            settings.seed, settings.render_distance, settings.cleanup_radius
        );

        Ok(EngineState {
            settings,
            world,
            mesh_manager,
            task_manager,
            generator,
            current_center_chunk: None,
        })
    }

    /// Per-frame update.
    ///
    /// Streams the world around the camera's chunk when the camera crossed a
    /// chunk border, then applies finished work and dispatches queued tasks.
    pub fn update(&mut self, camera_position: Point3<f32>) {
        let center = ChunkCoord::containing(camera_position);
        if self.current_center_chunk != Some(center) {
            self.stream_around(center);
            self.current_center_chunk = Some(center);
        }
        self.process_tasks();
    }

    /// Evicts chunks outside the cleanup radius and schedules generation of
    /// every missing chunk inside the render distance, nearest first.
    pub fn stream_around(&mut self, center: ChunkCoord) {
        let radius = self.settings.render_distance;

        let mut wanted: Vec<ChunkCoord> = (-radius..=radius)
            .flat_map(|dx| (-radius..=radius).map(move |dz| center.offset(dx, dz)))
            .collect();
        wanted.sort_by_key(|coord| {
            let (dx, dz) = (coord.x - center.x, coord.z - center.z);
            (dx * dx + dz * dz, *coord)
        });

        let mut new_slots = Vec::new();
        let evicted = {
            let mut world = self.world.get_mut();
            let evicted = world.evict_chunks_outside_radius(center, self.settings.cleanup_radius);
            for coord in wanted {
                let (slot, newly_created) = world.ensure_chunk_loaded(coord);
                if newly_created {
                    new_slots.push(slot);
                }
            }
            evicted
        };

        if !evicted.is_empty() {
            let mut mesh_manager = self.mesh_manager.get_mut();
            for coord in &evicted {
                mesh_manager.remove(*coord);
            }
        }

        info!(
            "Streaming around {:?}: {} chunks scheduled, {} evicted",
            center,
            new_slots.len(),
            evicted.len()
        );

        for slot in new_slots {
            self.task_manager
                .publish_task(Box::new(ChunkGenerationTask::new(self.generator.clone(), slot)));
        }
    }

    /// Applies finished task results and dispatches queued tasks.
    pub fn process_tasks(&mut self) {
        self.task_manager.process_completed_tasks();
        self.task_manager.process_queued_tasks();
    }

    /// Processes tasks until no work is queued or in flight.
    ///
    /// # Returns
    /// `true` if the engine went idle, `false` if `timeout` elapsed first.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            self.process_tasks();
            if self.task_manager.is_idle() {
                debug!("Engine idle after {:?}", start.elapsed());
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Drains the chunks whose instance buffer changed since the last call.
    pub fn take_pending_uploads(&mut self) -> Vec<MeshUpload> {
        self.mesh_manager.get_mut().take_pending_uploads()
    }

    /// World-space bounds of a loaded chunk, for frustum culling.
    pub fn chunk_bounding_box(&self, coord: ChunkCoord) -> Option<BoundingBox> {
        self.world.get().chunk_bounding_box(coord)
    }

    /// The generator used for this world.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn stats(&self) -> EngineStats {
        let (loaded_chunks, generated_chunks) = {
            let world = self.world.get();
            (world.len(), world.generated_count())
        };
        let (meshed_chunks, total_faces) = {
            let mesh_manager = self.mesh_manager.get();
            (mesh_manager.len(), mesh_manager.total_instances())
        };
        EngineStats {
            loaded_chunks,
            generated_chunks,
            meshed_chunks,
            total_faces,
            queued_tasks: self.task_manager.queued_len(),
            in_flight_tasks: self.task_manager.in_flight(),
        }
    }

    /// Stops all workers and waits for them to exit.
    pub fn shutdown(&mut self) {
        info!("Shutting down engine");
        self.task_manager.shutdown();
    }
}
