//! # Voxel World Entry Point
//!
//! Runs a headless streaming session around the origin and logs statistics.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [settings.json]
//! ```

fn main() -> anyhow::Result<()> {
    voxel_world::run()
}
