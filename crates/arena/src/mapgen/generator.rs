//! High-level orchestration of the generation pipeline and completion notification.

use tracing::{debug, info};

use crate::config::{ArenaConfig, ConfigError};
use crate::grid::TileGrid;

use super::automaton;
use super::connectivity::{self, ConnectivityReport};
use super::detail::{self, DetailReport};
use super::regions;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub wall_regions_pruned: usize,
    pub rooms_found: usize,
    pub connectivity: ConnectivityReport,
    pub detail: DetailReport,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedArena {
    pub seed: u64,
    pub grid: TileGrid,
    pub report: GenerationReport,
}

/// Collaborators that may only start once the final grid exists (spawning, navigation setup).
pub trait GenerationListener {
    fn on_generation_complete(&mut self, arena: &GeneratedArena);
}

pub struct ArenaGenerator {
    config: ArenaConfig,
}

impl ArenaGenerator {
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Skips validation; degenerate settings still produce a bordered grid.
    pub(crate) fn unchecked(config: ArenaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn generate(&self, seed: u64) -> GeneratedArena {
        let config = &self.config;
        let raw = automaton::generate(
            config.width,
            config.height,
            seed,
            config.fill_percent,
            config.smoothing_iterations,
        );

        let analysis = regions::analyze(&raw);
        debug!(
            rooms = analysis.rooms.len(),
            pruned = analysis.wall_regions_pruned,
            "region analysis finished"
        );

        let mut rooms = analysis.rooms;
        let rooms_found = rooms.len();
        let (connected, connectivity) =
            connectivity::connect(analysis.grid, &mut rooms, config.passage_width);

        let (grid, detail) = detail::detail(connected, &config.clusters, seed);

        let report = GenerationReport {
            wall_regions_pruned: analysis.wall_regions_pruned,
            rooms_found,
            connectivity,
            detail,
        };
        info!(
            seed,
            width = config.width,
            height = config.height,
            rooms = report.rooms_found,
            passages = report.connectivity.passages_carved,
            skipped_patches = report.detail.patches_skipped,
            "arena generated"
        );

        GeneratedArena { seed, grid, report }
    }

    /// Generates the arena and notifies `listener` once the whole pipeline has finished.
    pub fn generate_with<L>(&self, seed: u64, listener: &mut L) -> GeneratedArena
    where
        L: GenerationListener + ?Sized,
    {
        let arena = self.generate(seed);
        listener.on_generation_complete(&arena);
        arena
    }
}
