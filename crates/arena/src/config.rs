//! Arena and pathfinding settings, loadable from TOML.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TileKind;

pub const MIN_DIMENSION: usize = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("arena must be at least {MIN_DIMENSION}x{MIN_DIMENSION}, got {width}x{height}")]
    TooSmall { width: usize, height: usize },
    #[error("fill percent must be within 0..=100, got {0}")]
    FillPercentOutOfRange(u8),
    #[error("passage width must be at least 1")]
    ZeroPassageWidth,
    #[error("cluster {index} uses a wall tile; clusters may only stamp walkable terrain")]
    WallCluster { index: usize },
    #[error("pathfinding needs at least one worker thread")]
    NoWorkers,
    #[error("failed to read config file")]
    Io(#[from] io::Error),
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}

/// One terrain cluster request: `count` random-walk patches of `patch_size` steps each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub tile: TileKind,
    pub count: u32,
    pub patch_size: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: usize,
    pub height: usize,
    pub fill_percent: u8,
    pub smoothing_iterations: u32,
    pub passage_width: u32,
    pub clusters: Vec<ClusterSpec>,
    pub enemy_count: usize,
    pub path: PathSettings,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 60,
            fill_percent: 48,
            smoothing_iterations: 5,
            passage_width: 1,
            clusters: vec![
                ClusterSpec { tile: TileKind::DetailA, count: 6, patch_size: 40 },
                ClusterSpec { tile: TileKind::DetailB, count: 3, patch_size: 30 },
            ],
            enemy_count: 3,
            path: PathSettings::default(),
        }
    }
}

impl ArenaConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_DIMENSION || self.height < MIN_DIMENSION {
            return Err(ConfigError::TooSmall { width: self.width, height: self.height });
        }
        if self.fill_percent > 100 {
            return Err(ConfigError::FillPercentOutOfRange(self.fill_percent));
        }
        if self.passage_width == 0 {
            return Err(ConfigError::ZeroPassageWidth);
        }
        if let Some(index) = self.clusters.iter().position(|cluster| cluster.tile == TileKind::Wall)
        {
            return Err(ConfigError::WallCluster { index });
        }
        if self.path.worker_threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    BreadthFirst,
    #[default]
    AStar,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighborhood {
    #[default]
    Four,
    Eight,
}

/// Additive A* cost for entering a tile of each walkable kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementPenalties {
    pub floor: u32,
    pub detail_a: u32,
    pub detail_b: u32,
}

impl Default for MovementPenalties {
    fn default() -> Self {
        Self { floor: 0, detail_a: 5, detail_b: 10 }
    }
}

impl MovementPenalties {
    pub fn uniform() -> Self {
        Self { floor: 0, detail_a: 0, detail_b: 0 }
    }

    pub fn for_tile(&self, tile: TileKind) -> u32 {
        match tile {
            TileKind::Wall => 0,
            TileKind::Floor => self.floor,
            TileKind::DetailA => self.detail_a,
            TileKind::DetailB => self.detail_b,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub mode: SearchMode,
    pub neighborhood: Neighborhood,
    pub penalties: MovementPenalties,
    pub worker_threads: usize,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            mode: SearchMode::AStar,
            neighborhood: Neighborhood::Four,
            penalties: MovementPenalties::default(),
            worker_threads: 2,
        }
    }
}
