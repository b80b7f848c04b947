//! # Voxel World Entry Point
//!
//! Runs the engine headless with a scripted walk. It simply calls into the library's
//! `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [ticks]
//! ```

fn main() -> anyhow::Result<()> {
    voxel_world::run()
}
