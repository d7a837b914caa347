//! # Voxel World Data
//!
//! This module contains everything that describes the world itself, as
//! opposed to how it is drawn.
//!
//! ## Architecture
//!
//! * **Block**: the fixed registry of block types and their per-face textures
//! * **Chunk**: dense 16x128x16 block grids addressed by chunk coordinate
//! * **Generation**: noise driven terrain, biomes, caves and features
//! * **World**: the sparse chunk store and its lifecycle flags
//! * **Tasks**: chunk generation on worker threads
//!
//! ## Data Flow
//!
//! 1. The engine reserves an in-flight slot in the world for a new chunk
//! 2. A generation task fills a grid off the world lock and publishes it
//! 3. The task result schedules meshing of the chunk and its generated
//!    neighbors

pub mod block;
pub mod chunk;
pub mod generation;
pub mod tasks;
pub mod world;
