#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! Procedural voxel terrain split into 16x128x16 chunks, and the face culling
//! mesh builder that turns each chunk into a compact buffer of visible block
//! faces for instanced rendering.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives used throughout the engine
//! * `engine_state` - Blocks, chunks, terrain, meshing, the worker pool and
//!   the `EngineState` that ties them together
//!
//! ## Architecture
//!
//! * Terrain is generated per chunk on worker threads from layered noise and
//!   a per-column RNG, so the same seed always yields the same world
//! * Each generated chunk is meshed against its generated neighbors; when a
//!   neighbor arrives later, the chunk is remeshed
//! * The newest mesh of every chunk is kept in a mesh store that the
//!   embedding renderer drains for uploads
//!
//! Windowing, input, shaders and the draw loop are left to the embedding
//! application.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     voxel_world::run()
//! }
//! ```

use std::time::Duration;

use cfg_if::cfg_if;
use cgmath::Point3;
use log::info;

pub mod core;
pub mod engine_state;

pub use engine_state::settings::WorldSettings;
pub use engine_state::EngineState;

/// How long the headless session waits for the initial area to finish.
pub const HEADLESS_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Installs the platform logger.
///
/// Native builds log to stdout through `env_logger`, filtered by `RUST_LOG`.
/// WASM builds log to the browser console and forward panics to it.
pub fn init_logging() {
    cfg_if! {
        if #[cfg(target_family = "wasm")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            if console_log::init_with_level(log::Level::Info).is_err() {
                log::warn!("Logger already initialized");
            }
        } else {
            let mut log_builder = env_logger::Builder::new();
            log_builder
                .target(env_logger::Target::Stdout)
                .parse_env("RUST_LOG");
            if log_builder.try_init().is_err() {
                log::warn!("Logger already initialized");
            }
        }
    }
}

/// Runs a headless streaming session.
///
/// Loads settings from the JSON file named by the first command line argument
/// (defaults otherwise), generates and meshes the area around the origin,
/// logs what was built and shuts the workers down.
pub fn run() -> anyhow::Result<()> {
    init_logging();
    info!("Logger initialized");

    let settings = match std::env::args().nth(1) {
        Some(path) => WorldSettings::load(path)?,
        None => WorldSettings::default(),
    };

    let mut engine_state = EngineState::new(settings)?;
    let spawn_height = engine_state.generator().column_height(0, 0) as f32 + 2.0;
    engine_state.update(Point3::new(0.0, spawn_height, 0.0));

    if !engine_state.wait_until_idle(HEADLESS_IDLE_TIMEOUT) {
        log::warn!("Timed out waiting for the world to finish streaming");
    }

    let uploads = engine_state.take_pending_uploads();
    let upload_bytes: usize = uploads.iter().map(|upload| upload.mesh.as_bytes().len()).sum();
    let stats = engine_state.stats();
    info!(
        "{} chunks loaded, {} meshed, {} faces, {} bytes of instance data",
        stats.loaded_chunks, stats.meshed_chunks, stats.total_faces, upload_bytes
    );

    engine_state.shutdown();
    Ok(())
}
