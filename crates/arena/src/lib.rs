pub mod config;
pub mod grid;
pub mod logging;
pub mod mapgen;
pub mod pathfinding;
pub mod snapshot;
pub mod spawns;
pub mod types;

pub use config::{ArenaConfig, ClusterSpec, ConfigError, PathSettings};
pub use grid::{TileGrid, is_walkable, tile_at};
pub use mapgen::{ArenaGenerator, GeneratedArena, GenerationListener, GenerationReport, generate_arena};
pub use pathfinding::{
    PathError, PathListener, PathResult, PathService, PathfindingEngine, ServiceError,
};
pub use snapshot::ArenaSnapshot;
pub use spawns::{Spawn, SpawnKind, Spawner};
pub use types::*;
