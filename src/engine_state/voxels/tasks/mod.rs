//! # Voxel Task System
//!
//! Tasks that build world data on worker threads.

pub mod chunk_generation_task;
