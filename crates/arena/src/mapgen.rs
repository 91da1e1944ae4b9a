//! Procedural arena generation split into one submodule per pipeline phase.

pub mod automaton;
pub mod connectivity;
pub mod detail;
pub mod regions;

mod generator;
pub(crate) mod seed;

pub use connectivity::ConnectivityReport;
pub use detail::DetailReport;
pub use generator::{ArenaGenerator, GeneratedArena, GenerationListener, GenerationReport};
pub use regions::{Room, WALL_REGION_THRESHOLD};

use crate::config::{ArenaConfig, ClusterSpec};
use crate::grid::TileGrid;

/// Runs the full pipeline with default passage width and returns the final grid.
pub fn generate_arena(
    seed: u64,
    width: usize,
    height: usize,
    fill_percent: u8,
    iterations: u32,
    clusters: &[ClusterSpec],
) -> TileGrid {
    let config = ArenaConfig {
        width,
        height,
        fill_percent,
        smoothing_iterations: iterations,
        clusters: clusters.to_vec(),
        ..ArenaConfig::default()
    };
    ArenaGenerator::unchecked(config).generate(seed).grid
}
