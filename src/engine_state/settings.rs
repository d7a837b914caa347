//! # World Settings
//!
//! Runtime configuration of the engine, read from JSON. Every field has a
//! default, so a settings file only needs the values it changes:
//!
//! ```json
//! { "seed": 42, "render_distance": 8 }
//! ```
//!
//! Chunk dimensions, sea level and noise parameters are compile-time
//! constants and are not configurable here.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::engine_state::rendering::meshing::MeshOptions;

/// Default world seed.
pub const DEFAULT_SEED: u32 = 1223;
/// Default render distance, in chunks around the camera's chunk.
pub const DEFAULT_RENDER_DISTANCE: i32 = 5;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Seed of every noise field and per-column RNG
    pub seed: u32,
    /// Square radius, in chunks, of the area kept generated and meshed
    pub render_distance: i32,
    /// Square radius, in chunks, beyond which chunks are evicted.
    /// Must be at least `render_distance`.
    pub cleanup_radius: i32,
    /// Number of worker threads; 0 picks the available parallelism
    pub worker_count: usize,
    /// Hide the bottom faces of the world
    pub cull_world_floor: bool,
    /// Maximum number of chunk meshes kept in the mesh store.
    /// Must cover every chunk the cleanup radius can keep loaded.
    pub mesh_cache_capacity: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        WorldSettings {
            seed: DEFAULT_SEED,
            render_distance: DEFAULT_RENDER_DISTANCE,
            cleanup_radius: DEFAULT_RENDER_DISTANCE + 2,
            worker_count: 0,
            cull_world_floor: false,
            mesh_cache_capacity: 512,
        }
    }
}

impl WorldSettings {
    /// Parses settings from a JSON document and validates them.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let settings: WorldSettings =
            serde_json::from_str(json).context("Malformed world settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Checks the relationships between fields.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.render_distance >= 0,
            "render_distance must not be negative, got {}",
            self.render_distance
        );
        ensure!(
            self.cleanup_radius >= self.render_distance,
            "cleanup_radius ({}) must be at least render_distance ({})",
            self.cleanup_radius,
            self.render_distance
        );
        ensure!(
            self.mesh_cache_capacity >= self.max_loaded_chunks(),
            "mesh_cache_capacity ({}) must hold every chunk within cleanup_radius {} ({} chunks)",
            self.mesh_cache_capacity,
            self.cleanup_radius,
            self.max_loaded_chunks()
        );
        Ok(())
    }

    /// Upper bound on the number of chunks loaded at once.
    pub fn max_loaded_chunks(&self) -> usize {
        let side = 2 * self.cleanup_radius.max(0) as usize + 1;
        side * side
    }

    /// Worker count with 0 resolved to the available parallelism.
    pub fn effective_worker_count(&self) -> usize {
        if self.worker_count > 0 {
            return self.worker_count;
        }
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }

    /// Mesh store capacity, at least one.
    pub fn mesh_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.mesh_cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn mesh_options(&self) -> MeshOptions {
        MeshOptions {
            cull_world_floor: self.cull_world_floor,
        }
    }
}
