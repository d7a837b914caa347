use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use cgmath::Point3;
use voxel_world::core::MtResource;
use voxel_world::engine_state::rendering::meshing::{MeshManager, MeshOptions};
use voxel_world::engine_state::rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use voxel_world::engine_state::settings::WorldSettings;
use voxel_world::engine_state::task_management::task::{Task, TaskContext};
use voxel_world::engine_state::voxels::chunk::ChunkCoord;
use voxel_world::engine_state::voxels::generation::TerrainGenerator;
use voxel_world::engine_state::voxels::tasks::chunk_generation_task::ChunkGenerationTask;
use voxel_world::engine_state::voxels::world::World;
use voxel_world::EngineState;

fn test_context(seed: u32) -> TaskContext {
    TaskContext {
        world: MtResource::new(World::new()),
        mesh_manager: MtResource::new(MeshManager::new(NonZeroUsize::new(64).unwrap())),
        generator: Arc::new(TerrainGenerator::new(seed)),
        mesh_options: MeshOptions::default(),
    }
}

/// Runs `task` and applies its result inline, returning the follow-ups.
fn run_inline(task: Box<dyn Task + Send>, context: &TaskContext) -> Vec<Box<dyn Task + Send>> {
    task.process().handle_result(context)
}

/// Runs `task` and every follow-up it spawns, breadth first.
fn run_to_completion(task: Box<dyn Task + Send>, context: &TaskContext) {
    let mut pending = vec![task];
    while let Some(task) = pending.pop() {
        pending.extend(run_inline(task, context));
    }
}

fn generate(context: &TaskContext, coord: ChunkCoord) {
    let (slot, newly_created) = context.world.get_mut().ensure_chunk_loaded(coord);
    assert!(newly_created);
    run_to_completion(
        Box::new(ChunkGenerationTask::new(context.generator.clone(), slot)),
        context,
    );
}

#[test]
fn neighbor_arrival_remeshes_the_existing_chunk() {
    let context = test_context(1223);
    let origin = ChunkCoord::new(0, 0);

    generate(&context, origin);
    let first = context.mesh_manager.get().get(origin).cloned().unwrap();
    assert_eq!(first.revision, 1);

    generate(&context, ChunkCoord::new(1, 0));
    let second = context.mesh_manager.get().get(origin).cloned().unwrap();
    assert_eq!(second.revision, 2);
    // The +X boundary can only gain faces once the neighbor is known.
    assert!(second.mesh.len() >= first.mesh.len());

    assert!(context.mesh_manager.get().is_chunk_meshed(ChunkCoord::new(1, 0)));
}

#[test]
fn stale_mesh_results_do_not_replace_newer_ones() {
    let context = test_context(9);
    let coord = ChunkCoord::new(2, 2);
    let (slot, _) = context.world.get_mut().ensure_chunk_loaded(coord);
    slot.publish_generated(context.generator.generate_chunk(coord));

    let older = ChunkMeshGenerationTask::new(&context, slot.clone());
    let newer = ChunkMeshGenerationTask::new(&context, slot.clone());
    let older_result = older.process();
    let newer_result = newer.process();

    newer_result.handle_result(&context);
    older_result.handle_result(&context);

    assert_eq!(context.mesh_manager.get().get(coord).unwrap().revision, 2);
    assert_eq!(slot.current_mesh_revision(), 2);
}

#[test]
fn eviction_keeps_in_flight_chunks_usable() {
    let context = test_context(4);
    let coord = ChunkCoord::new(5, 5);
    let (slot, _) = context.world.get_mut().ensure_chunk_loaded(coord);
    let task = ChunkGenerationTask::new(context.generator.clone(), slot.clone());

    let evicted = context
        .world
        .get_mut()
        .evict_chunks_outside_radius(ChunkCoord::new(0, 0), 1);
    assert_eq!(evicted, vec![coord]);

    // The task still owns the slot and fills it.
    let result = task.process();
    assert!(slot.is_generated());
    assert!(slot.chunk.get().as_ref().is_some_and(|chunk| chunk.solid_block_count() > 0));

    // Nothing is meshed for a chunk the world no longer holds.
    assert!(result.handle_result(&context).is_empty());
    assert!(context.mesh_manager.get().is_empty());
}

#[test]
fn reloaded_chunk_discards_results_of_its_old_slot() {
    let context = test_context(4);
    let coord = ChunkCoord::new(0, 0);
    let (old_slot, _) = context.world.get_mut().ensure_chunk_loaded(coord);
    old_slot.publish_generated(context.generator.generate_chunk(coord));
    let stale_mesh = ChunkMeshGenerationTask::new(&context, old_slot.clone()).process();

    context
        .world
        .get_mut()
        .evict_chunks_outside_radius(ChunkCoord::new(10, 10), 0);
    let (new_slot, newly_created) = context.world.get_mut().ensure_chunk_loaded(coord);
    assert!(newly_created);
    assert!(!Arc::ptr_eq(&old_slot, &new_slot));

    stale_mesh.handle_result(&context);
    assert!(!context.mesh_manager.get().is_chunk_meshed(coord));
}

fn settings(seed: u32, worker_count: usize) -> WorldSettings {
    WorldSettings {
        seed,
        render_distance: 1,
        cleanup_radius: 2,
        worker_count,
        ..WorldSettings::default()
    }
}

#[test]
fn worker_count_does_not_change_the_world() {
    let mut single = EngineState::new(settings(31, 1)).unwrap();
    let mut pooled = EngineState::new(settings(31, 4)).unwrap();
    for engine in [&mut single, &mut pooled] {
        engine.update(Point3::new(8.0, 80.0, 8.0));
        assert!(engine.wait_until_idle(Duration::from_secs(60)));
    }

    for dx in -1..=1 {
        for dz in -1..=1 {
            let coord = ChunkCoord::new(dx, dz);
            let a = single.world.get().get_generated_chunk_at(coord).unwrap();
            let b = pooled.world.get().get_generated_chunk_at(coord).unwrap();
            let (grid_a, grid_b) = (a.chunk.get(), b.chunk.get());
            assert_eq!(
                grid_a.as_ref().map(|chunk| chunk.as_bytes()),
                grid_b.as_ref().map(|chunk| chunk.as_bytes())
            );

            let mesh_a = single.mesh_manager.get().get(coord).unwrap().mesh.clone();
            let mesh_b = pooled.mesh_manager.get().get(coord).unwrap().mesh.clone();
            assert_eq!(mesh_a.as_bytes(), mesh_b.as_bytes(), "mesh of {:?} differs", coord);
        }
    }

    single.shutdown();
    pooled.shutdown();
}

#[test]
fn uploads_are_drained_once() {
    let mut engine = EngineState::new(settings(2, 2)).unwrap();
    engine.update(Point3::new(0.0, 80.0, 0.0));
    assert!(engine.wait_until_idle(Duration::from_secs(60)));

    let uploads = engine.take_pending_uploads();
    assert_eq!(uploads.len(), 9);
    assert!(uploads.iter().all(|upload| upload.revision >= 1));
    assert!(engine.take_pending_uploads().is_empty());

    engine.shutdown();
}

#[test]
fn staying_in_the_same_chunk_schedules_nothing_new() {
    let mut engine = EngineState::new(settings(2, 1)).unwrap();
    engine.update(Point3::new(1.0, 80.0, 1.0));
    assert!(engine.wait_until_idle(Duration::from_secs(60)));

    engine.update(Point3::new(14.0, 90.0, 14.0));
    assert!(engine.task_manager.is_idle());
    assert_eq!(engine.stats().loaded_chunks, 9);

    engine.shutdown();
}

#[test]
fn shutdown_is_idempotent() {
    let mut engine = EngineState::new(settings(8, 3)).unwrap();
    engine.update(Point3::new(0.0, 80.0, 0.0));
    engine.shutdown();
    engine.shutdown();
}

#[test]
fn mesh_cache_smaller_than_the_loaded_area_is_refused() {
    let json = r#"{ "render_distance": 1, "cleanup_radius": 1, "mesh_cache_capacity": 4 }"#;
    assert!(WorldSettings::from_json_str(json).is_err());

    let undersized = WorldSettings {
        cleanup_radius: 1,
        mesh_cache_capacity: 4,
        ..settings(3, 1)
    };
    assert!(EngineState::new(undersized).is_err());
}
