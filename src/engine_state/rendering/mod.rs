//! Rendering data for the voxel engine.
//!
//! This module turns chunk grids into per-face instance buffers and keeps the
//! newest buffer of each chunk for upload. Drawing them (surfaces, pipelines,
//! shaders, the render loop) is left to the embedding application; the
//! instance layout it needs is described by [`FaceInstance::desc`].

pub mod instance;
pub mod meshing;
pub mod tasks;

// Re-export commonly used types
pub use instance::{FaceInstance, InstanceLayout};
pub use meshing::MeshManager;
