#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! An infinite, chunked block world: procedural terrain, face-culled chunk meshes with
//! ambient occlusion, streaming and eviction of chunks around a player, and a block
//! automaton that grows trees and lets water flow.
//!
//! ## Key Modules
//!
//! * `engine_state` - The engine tick, configuration, the player and all voxel and
//!   meshing subsystems
//!
//! ## Architecture
//!
//! The engine follows a modular architecture with clear separation between:
//! * Voxel data management (blocks, chunks, the chunk registry)
//! * World simulation (terrain generation, the block automaton, player physics)
//! * Geometry generation (meshing, ambient occlusion, the draw list)
//! * The graphics API, which stays behind the `DrawableSurface` trait
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() -> anyhow::Result<()> {
//!     voxel_world::run()
//! }
//! ```
//!
//! The binary takes an optional JSON configuration path and an optional tick count:
//!
//! ```text
//! voxel-world [config.json] [ticks]
//! ```

use std::env;

use anyhow::Context;
use log::info;
use web_time::Instant;

use engine_state::{
    config::EngineConfig, player::PlayerInput, rendering::surface::HeadlessSurfaceFactory,
    EngineState, TickReport,
};

pub mod engine_state;

/// Ticks run when no count is given.
pub const DEFAULT_TICKS: u64 = 600;

/// Simulated seconds per tick.
const TICK_SECONDS: f32 = 1.0 / 60.0;

/// Runs the engine headless for a fixed number of ticks.
///
/// The player follows a scripted walk: always forward, turning slowly, jumping and
/// digging now and then. Geometry goes to in-memory surfaces whose counters are logged
/// at the end.
pub fn run() -> anyhow::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };
    let ticks = match args.next() {
        Some(count) => count
            .parse::<u64>()
            .with_context(|| format!("Tick count {:?} is not a number", count))?,
        None => DEFAULT_TICKS,
    };

    let surfaces = HeadlessSurfaceFactory::new();
    let surface_stats = surfaces.stats();
    let mut engine = EngineState::new(config, Box::new(surfaces));

    let start = Instant::now();
    let mut totals = TickReport::default();
    let mut drawn = 0;
    for tick in 0..ticks {
        let report = engine.tick(TICK_SECONDS, &scripted_input(tick));
        totals.generated += report.generated;
        totals.evicted += report.evicted;
        totals.rebuilt += report.rebuilt;
        totals.block_updates += report.block_updates;
        drawn = engine.render();
    }

    info!("{}", engine.stats());
    info!(
        "Ran {} ticks in {:?}: {} chunks generated, {} evicted, {} rebuilt, {} block updates",
        ticks,
        start.elapsed(),
        totals.generated,
        totals.evicted,
        totals.rebuilt,
        totals.block_updates
    );
    info!(
        "Last frame drew {} models; {} surfaces alive, {} uploads ({} bytes), {} triangles drawn",
        drawn,
        surface_stats.live_surfaces.get(),
        surface_stats.uploads.get(),
        surface_stats.uploaded_bytes.get(),
        surface_stats.triangles_drawn.get()
    );
    Ok(())
}

/// The input of one tick of the scripted walk.
fn scripted_input(tick: u64) -> PlayerInput {
    PlayerInput {
        forward: true,
        jump: tick % 90 == 0,
        dig: tick % 120 == 60,
        yaw: tick as f32 * 0.002,
        pitch: -0.3,
        ..PlayerInput::default()
    }
}
