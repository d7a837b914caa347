//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Builds the face instance buffer of a chunk

pub mod chunk_mesh_generation_task;
