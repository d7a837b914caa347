//! Biome classification of terrain columns.

use crate::engine_state::voxels::block::block_type::BlockType;

/// Biome noise above this value makes a forest column.
pub const FOREST_THRESHOLD: f64 = 0.2;
/// Biome noise below this value makes a desert column.
pub const DESERT_THRESHOLD: f64 = -0.2;

/// The climate of a single terrain column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Plains,
    Forest,
    Desert,
}

impl Biome {
    /// Classifies a raw biome noise sample.
    pub fn from_noise(value: f64) -> Self {
        if value > FOREST_THRESHOLD {
            Biome::Forest
        } else if value < DESERT_THRESHOLD {
            Biome::Desert
        } else {
            Biome::Plains
        }
    }

    /// Block placed on top of a column.
    ///
    /// Submerged surfaces are always sand so lake beds and beaches read as such.
    pub fn surface_block(self, submerged: bool) -> BlockType {
        match self {
            _ if submerged => BlockType::SAND,
            Biome::Desert => BlockType::SAND,
            Biome::Plains | Biome::Forest => BlockType::GRASS,
        }
    }

    /// Block used for the layers directly under the surface.
    pub fn subsurface_block(self, submerged: bool) -> BlockType {
        match self {
            _ if submerged => BlockType::SAND,
            Biome::Desert => BlockType::SAND,
            Biome::Plains | Biome::Forest => BlockType::DIRT,
        }
    }
}
