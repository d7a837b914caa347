//! # Terrain Generation
//!
//! Deterministic procedural fill of a chunk from the world seed and the
//! chunk's coordinate.
//!
//! ## Pipeline
//!
//! For every column of the chunk:
//! 1. a low frequency fBm Perlin field gives the base elevation
//! 2. an OpenSimplex field adds small scale detail
//! 3. a very low frequency field picks the biome
//! 4. the column is stratified: bedrock floor, stone, three subsurface layers,
//!    then the surface block, and water up to [`SEA_LEVEL`]
//! 5. cave pockets and tunnels are carved below the surface
//!
//! Trees and cacti are placed in a second pass once every column is filled,
//! so no column can overwrite a neighboring column's structure.
//!
//! All noise is sampled in world coordinates, so terrain is continuous across
//! chunk borders. Random draws come from a per-column RNG seeded from the world
//! seed and the world column, so the result does not depend on the order
//! chunks are generated in.

use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex, Perlin};

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{Chunk, ChunkCoord, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

use biome::Biome;

pub mod biome;
pub mod features;

/// Columns whose surface lies below this height are flooded up to it.
pub const SEA_LEVEL: i32 = 60;

/// Elevation around which the base field oscillates.
pub const BASE_HEIGHT: f64 = 64.0;
/// Amplitude of the base elevation field, in blocks.
pub const BASE_AMPLITUDE: f64 = 24.0;
/// Amplitude of the detail field, in blocks.
pub const DETAIL_AMPLITUDE: f64 = 4.0;

pub const BASE_FREQUENCY: f64 = 0.01;
pub const DETAIL_FREQUENCY: f64 = 0.05;
pub const BIOME_FREQUENCY: f64 = 0.005;
pub const CAVE_FREQUENCY: f64 = 0.08;
pub const TUNNEL_FREQUENCY: f64 = 0.025;

/// Cave noise above this value is carved out.
pub const CAVE_THRESHOLD: f64 = 0.45;
/// Tunnel noise within `(-TUNNEL_WINDOW, TUNNEL_WINDOW)` on both tunnel fields is carved out.
pub const TUNNEL_WINDOW: f64 = 0.06;

/// Number of subsurface (dirt or sand) layers under the surface block.
pub const SUBSURFACE_DEPTH: i32 = 3;

/// Per-column chance that a suitable forest column grows a tree.
pub const TREE_CHANCE: f32 = 0.03;
/// Per-column chance that a suitable desert column grows a cactus.
pub const CACTUS_CHANCE: f32 = 0.01;
/// Minimum surface height above sea level for a tree.
pub const TREE_MIN_HEIGHT_ABOVE_SEA: i32 = 2;
/// Minimum surface height above sea level for a cactus.
pub const CACTUS_MIN_HEIGHT_ABOVE_SEA: i32 = 1;

/// A structure chosen for a column during the terrain pass.
#[derive(Debug)]
enum PendingFeature {
    Tree { x: i32, base: i32, z: i32 },
    Cactus { x: i32, base: i32, z: i32, rng: fastrand::Rng },
}

/// Seeded terrain generator.
///
/// Construction builds the noise permutation tables once; generating chunks
/// only reads them, so a single generator can be shared by all workers.
pub struct TerrainGenerator {
    seed: u32,
    base: Fbm<Perlin>,
    detail: OpenSimplex,
    biome: Perlin,
    caves: Perlin,
    tunnels_a: Perlin,
    tunnels_b: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator for the given world seed.
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            seed,
            base: Fbm::<Perlin>::new(seed)
                .set_octaves(4)
                .set_frequency(BASE_FREQUENCY),
            detail: OpenSimplex::new(seed.wrapping_add(1)),
            biome: Perlin::new(seed.wrapping_add(2)),
            caves: Perlin::new(seed.wrapping_add(3)),
            tunnels_a: Perlin::new(seed.wrapping_add(4)),
            tunnels_b: Perlin::new(seed.wrapping_add(5)),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Height of the surface block of a world column.
    ///
    /// Always within `1..=CHUNK_SIZE_Y - 1`, so the bedrock floor and the
    /// surface never share a cell.
    pub fn column_height(&self, world_x: i32, world_z: i32) -> i32 {
        let (x, z) = (world_x as f64, world_z as f64);
        let base = self.base.get([x, z]);
        let detail = self
            .detail
            .get([x * DETAIL_FREQUENCY, z * DETAIL_FREQUENCY]);

        let height = BASE_HEIGHT + base * BASE_AMPLITUDE + detail * DETAIL_AMPLITUDE;
        (height.round() as i32).clamp(1, CHUNK_SIZE_Y as i32 - 1)
    }

    /// Biome of a world column.
    pub fn biome_at(&self, world_x: i32, world_z: i32) -> Biome {
        let value = self.biome.get([
            world_x as f64 * BIOME_FREQUENCY,
            world_z as f64 * BIOME_FREQUENCY,
        ]);
        Biome::from_noise(value)
    }

    /// Whether the cave or tunnel fields hollow out the given world cell.
    pub fn is_carved(&self, world_x: i32, y: i32, world_z: i32) -> bool {
        let (x, y, z) = (world_x as f64, y as f64, world_z as f64);

        let cave = self
            .caves
            .get([x * CAVE_FREQUENCY, y * CAVE_FREQUENCY, z * CAVE_FREQUENCY]);
        if cave > CAVE_THRESHOLD {
            return true;
        }

        let point = [x * TUNNEL_FREQUENCY, y * TUNNEL_FREQUENCY, z * TUNNEL_FREQUENCY];
        self.tunnels_a.get(point).abs() < TUNNEL_WINDOW
            && self.tunnels_b.get(point).abs() < TUNNEL_WINDOW
    }

    /// Deterministic RNG for a world column.
    pub fn column_rng(&self, world_x: i32, world_z: i32) -> fastrand::Rng {
        fastrand::Rng::with_seed(column_seed(self.seed, world_x, world_z))
    }

    /// Generates the chunk at `coord`, terrain and features included.
    pub fn generate_chunk(&self, coord: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::new(coord);
        self.fill_chunk(&mut chunk);
        chunk
    }

    /// Fills an empty chunk in place.
    pub fn fill_chunk(&self, chunk: &mut Chunk) {
        let (origin_x, origin_z) = chunk.coord.world_origin();
        let mut pending_features = Vec::new();

        for x in 0..CHUNK_SIZE_X {
            for z in 0..CHUNK_SIZE_Z {
                let world_x = origin_x + x as i32;
                let world_z = origin_z + z as i32;
                if let Some(feature) = self.fill_column(chunk, x, z, world_x, world_z) {
                    pending_features.push(feature);
                }
            }
        }

        for feature in pending_features {
            match feature {
                PendingFeature::Tree { x, base, z } => features::place_tree(chunk, x, base, z),
                PendingFeature::Cactus { x, base, z, mut rng } => {
                    features::place_cactus(chunk, x, base, z, &mut rng);
                }
            }
        }
    }

    fn fill_column(
        &self,
        chunk: &mut Chunk,
        x: usize,
        z: usize,
        world_x: i32,
        world_z: i32,
    ) -> Option<PendingFeature> {
        let height = self.column_height(world_x, world_z);
        let biome = self.biome_at(world_x, world_z);
        let submerged = height < SEA_LEVEL;

        chunk.set(x, 0, z, BlockType::BEDROCK);
        for y in 1..height {
            let block_type = if y >= height - SUBSURFACE_DEPTH {
                biome.subsurface_block(submerged)
            } else {
                BlockType::STONE
            };
            chunk.set(x, y as usize, z, block_type);
        }
        chunk.set(x, height as usize, z, biome.surface_block(submerged));

        for y in (height + 1)..=SEA_LEVEL {
            chunk.set(x, y as usize, z, BlockType::WATER);
        }

        // The surface cell stays, so water never drains into caves.
        for y in 1..height {
            if self.is_carved(world_x, y, world_z) {
                chunk.set(x, y as usize, z, BlockType::AIR);
            }
        }

        let mut rng = self.column_rng(world_x, world_z);
        let roll = rng.f32();
        let (x, z) = (x as i32, z as i32);
        match biome {
            Biome::Forest
                if height >= SEA_LEVEL + TREE_MIN_HEIGHT_ABOVE_SEA && roll < TREE_CHANCE =>
            {
                Some(PendingFeature::Tree { x, base: height, z })
            }
            Biome::Desert
                if height >= SEA_LEVEL + CACTUS_MIN_HEIGHT_ABOVE_SEA && roll < CACTUS_CHANCE =>
            {
                Some(PendingFeature::Cactus {
                    x,
                    base: height,
                    z,
                    rng,
                })
            }
            _ => None,
        }
    }
}

/// Mixes the world seed and a column position into an RNG seed.
fn column_seed(seed: u32, world_x: i32, world_z: i32) -> u64 {
    let mut hash = (seed as u64) ^ 0x9E37_79B9_7F4A_7C15;
    for value in [world_x as u32 as u64, world_z as u32 as u64] {
        hash ^= value;
        hash = hash.wrapping_mul(0xBF58_476D_1CE4_E5B9);
        hash ^= hash >> 31;
    }
    hash
}
