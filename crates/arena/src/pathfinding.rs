//! Tile-level path queries over a finished arena.
//! Searches read the shared grid and keep all per-query state in a scratch arena, so any
//! number of them can run at once against the same `Arc<TileGrid>`.

mod astar;
mod bfs;
mod scratch;
pub mod service;

use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use crate::config::{MovementPenalties, Neighborhood, PathSettings, SearchMode};
use crate::grid::TileGrid;
use crate::types::{Pos, WorldPos};

pub use service::{PathListener, PathService, ServiceError};

pub const AXIS_STEP_COST: u32 = 10;
pub const DIAGONAL_STEP_COST: u32 = 14;

const AXIS_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("tile {0:?} lies outside the arena")]
    OutOfBounds(Pos),
    #[error("start tile {0:?} is not walkable")]
    StartBlocked(Pos),
    #[error("goal tile {0:?} is not walkable")]
    GoalBlocked(Pos),
    #[error("no path from {start:?} to {goal:?}")]
    NoPath { start: Pos, goal: Pos },
}

impl PathError {
    /// Rejected before searching, as opposed to a search that ran and found nothing.
    pub fn is_invalid_query(&self) -> bool {
        !matches!(self, Self::NoPath { .. })
    }
}

/// Search-facing view of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathNode {
    pub pos: Pos,
    pub walkable: bool,
    pub movement_penalty: u32,
}

impl PathNode {
    pub fn at(grid: &TileGrid, pos: Pos, penalties: &MovementPenalties) -> Self {
        let tile = grid.tile_at(pos);
        Self { pos, walkable: tile.is_walkable(), movement_penalty: penalties.for_tile(tile) }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathResult {
    pub tiles: Vec<Pos>,
    pub waypoints: Vec<WorldPos>,
    pub success: bool,
}

impl PathResult {
    pub fn failure() -> Self {
        Self::default()
    }

    fn from_tiles(grid: &TileGrid, tiles: Vec<Pos>) -> Self {
        let waypoints = tiles.iter().map(|&pos| grid.grid_to_world(pos)).collect();
        Self { tiles, waypoints, success: true }
    }
}

fn validate_query(grid: &TileGrid, start: Pos, goal: Pos) -> Result<(), PathError> {
    for pos in [start, goal] {
        if !grid.in_bounds(pos) {
            return Err(PathError::OutOfBounds(pos));
        }
    }
    if !grid.is_walkable(start) {
        return Err(PathError::StartBlocked(start));
    }
    if !grid.is_walkable(goal) {
        return Err(PathError::GoalBlocked(goal));
    }
    Ok(())
}

/// In-bounds neighbours of `pos` paired with the base cost of stepping onto them.
fn step_neighbors(
    grid: &TileGrid,
    pos: Pos,
    neighborhood: Neighborhood,
) -> impl Iterator<Item = (Pos, u32)> + '_ {
    let diagonals: &[(i32, i32)] = match neighborhood {
        Neighborhood::Four => &[],
        Neighborhood::Eight => &DIAGONAL_OFFSETS,
    };
    let axis = AXIS_OFFSETS.iter().map(|&offset| (offset, AXIS_STEP_COST));
    let diagonal = diagonals.iter().map(|&offset| (offset, DIAGONAL_STEP_COST));
    axis.chain(diagonal).filter_map(move |((dx, dy), cost)| {
        let next = Pos { y: pos.y + dy, x: pos.x + dx };
        grid.in_bounds(next).then_some((next, cost))
    })
}

/// Octile distance scaled to the 10/14 step costs.
pub fn diagonal_distance(a: Pos, b: Pos) -> u32 {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    let (low, high) = if dx < dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_STEP_COST * low + AXIS_STEP_COST * (high - low)
}

/// Cost A* assigns to walking `path` from `start`; `None` if a step is not a grid move.
pub fn path_cost(
    grid: &TileGrid,
    start: Pos,
    path: &[Pos],
    penalties: &MovementPenalties,
) -> Option<u32> {
    let mut total = 0;
    let mut previous = start;
    for &pos in path {
        if !previous.is_adjacent_to(pos) {
            return None;
        }
        let step = if previous.x != pos.x && previous.y != pos.y {
            DIAGONAL_STEP_COST
        } else {
            AXIS_STEP_COST
        };
        total += step + penalties.for_tile(grid.tile_at(pos));
        previous = pos;
    }
    Some(total)
}

pub fn bfs_path(
    grid: &TileGrid,
    start: Pos,
    goal: Pos,
    neighborhood: Neighborhood,
) -> Result<Vec<Pos>, PathError> {
    validate_query(grid, start, goal)?;
    bfs::search(grid, start, goal, neighborhood).ok_or(PathError::NoPath { start, goal })
}

pub fn astar_path(
    grid: &TileGrid,
    start: Pos,
    goal: Pos,
    penalties: &MovementPenalties,
) -> Result<Vec<Pos>, PathError> {
    validate_query(grid, start, goal)?;
    astar::search(grid, start, goal, penalties).ok_or(PathError::NoPath { start, goal })
}

/// Answers path queries against one immutable arena.
#[derive(Clone, Debug)]
pub struct PathfindingEngine {
    grid: Arc<TileGrid>,
    settings: PathSettings,
}

impl PathfindingEngine {
    pub fn new(grid: Arc<TileGrid>, settings: PathSettings) -> Self {
        Self { grid, settings }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn settings(&self) -> &PathSettings {
        &self.settings
    }

    pub fn find_tile_path(&self, start: Pos, goal: Pos) -> Result<Vec<Pos>, PathError> {
        match self.settings.mode {
            SearchMode::BreadthFirst => {
                bfs_path(&self.grid, start, goal, self.settings.neighborhood)
            }
            SearchMode::AStar => astar_path(&self.grid, start, goal, &self.settings.penalties),
        }
    }

    /// World-space query; every failure collapses into `success = false` with no waypoints.
    pub fn find_path(&self, start: WorldPos, goal: WorldPos) -> PathResult {
        let start_tile = self.grid.world_to_grid(start);
        let goal_tile = self.grid.world_to_grid(goal);
        match self.find_tile_path(start_tile, goal_tile) {
            Ok(tiles) => PathResult::from_tiles(&self.grid, tiles),
            Err(err) => {
                trace!(%err, "path query failed");
                PathResult::failure()
            }
        }
    }
}
