//! Flood-fill region analysis: wall-pocket pruning and room extraction.

use std::collections::{BTreeSet, VecDeque};

use crate::grid::TileGrid;
use crate::types::{Pos, TileKind};

pub const WALL_REGION_THRESHOLD: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub tiles: Vec<Pos>,
    pub edge_tiles: Vec<Pos>,
    /// Indices into the room list this room was extracted with.
    pub connected_rooms: BTreeSet<usize>,
    pub is_main_room: bool,
    pub is_accessible_from_main_room: bool,
}

impl Room {
    fn from_region(tiles: Vec<Pos>, grid: &TileGrid) -> Self {
        let edge_tiles = tiles
            .iter()
            .copied()
            .filter(|&tile| grid.neighbors4(tile).any(|n| grid.tile_at(n) == TileKind::Wall))
            .collect();
        Self {
            tiles,
            edge_tiles,
            connected_rooms: BTreeSet::new(),
            is_main_room: false,
            is_accessible_from_main_room: false,
        }
    }

    pub fn size(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_connected(&self, other: usize) -> bool {
        self.connected_rooms.contains(&other)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionAnalysis {
    pub grid: TileGrid,
    pub rooms: Vec<Room>,
    pub wall_regions_pruned: usize,
}

pub fn analyze(grid: &TileGrid) -> RegionAnalysis {
    let mut pruned = grid.clone();
    let mut wall_regions_pruned = 0;
    for region in regions_of(grid, TileKind::Wall) {
        let touches_border = region.iter().any(|&pos| grid.is_border(pos));
        if region.len() < WALL_REGION_THRESHOLD && !touches_border {
            for pos in region {
                pruned.set_tile(pos, TileKind::Floor);
            }
            wall_regions_pruned += 1;
        }
    }

    let rooms = regions_of(&pruned, TileKind::Floor)
        .into_iter()
        .map(|region| Room::from_region(region, &pruned))
        .collect();

    RegionAnalysis { grid: pruned, rooms, wall_regions_pruned }
}

/// All maximal 4-connected regions of `kind`, in row-major order of their first tile.
pub fn regions_of(grid: &TileGrid, kind: TileKind) -> Vec<Vec<Pos>> {
    let mut visited = vec![false; grid.tiles().len()];
    let mut regions = Vec::new();
    for start in grid.positions() {
        let start_index = grid.index(start);
        if visited[start_index] || grid.tile_at(start) != kind {
            continue;
        }
        regions.push(flood_fill(grid, start, kind, &mut visited));
    }
    regions
}

fn flood_fill(grid: &TileGrid, start: Pos, kind: TileKind, visited: &mut [bool]) -> Vec<Pos> {
    let mut region = Vec::new();
    let mut queue = VecDeque::from([start]);
    visited[grid.index(start)] = true;

    while let Some(current) = queue.pop_front() {
        region.push(current);
        for next in grid.neighbors4(current) {
            let index = grid.index(next);
            if !visited[index] && grid.tile_at(next) == kind {
                visited[index] = true;
                queue.push_back(next);
            }
        }
    }
    region
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_interior_wall_pockets_become_floor() {
        let grid = TileGrid::from_ascii(&[
            "##########", //
            "#........#",
            "#.#....#.#",
            "#.##..##.#",
            "#......#.#",
            "#........#",
            "##########",
        ])
        .expect("valid grid");

        let analysis = analyze(&grid);

        // A three-tile and a four-tile pocket, both below the threshold.
        assert_eq!(analysis.wall_regions_pruned, 2);
        assert_eq!(analysis.grid.tile_at(Pos::new(2, 2)), TileKind::Floor);
        assert_eq!(analysis.grid.tile_at(Pos::new(6, 3)), TileKind::Floor);
        assert_eq!(analysis.grid.tile_at(Pos::new(7, 4)), TileKind::Floor);
        assert_eq!(analysis.rooms.len(), 1);
    }

    #[test]
    fn wall_regions_at_threshold_survive() {
        let grid = TileGrid::from_ascii(&[
            "#########", //
            "#.......#",
            "#.#####.#",
            "#.......#",
            "#########",
        ])
        .expect("valid grid");

        let analysis = analyze(&grid);
        assert_eq!(analysis.wall_regions_pruned, 0);
        assert_eq!(analysis.grid, grid);
    }

    #[test]
    fn border_ring_is_never_pruned_on_tiny_grids() {
        let grid = TileGrid::new(2, 2, TileKind::Floor);
        let analysis = analyze(&grid);
        assert_eq!(analysis.grid.count(TileKind::Wall), 4);
        assert!(analysis.rooms.is_empty());
    }

    #[test]
    fn separate_floor_regions_become_separate_rooms_with_edges() {
        let grid = TileGrid::from_ascii(&[
            "#########", //
            "#...#...#",
            "#...#...#",
            "#...#...#",
            "#########",
        ])
        .expect("valid grid");

        let analysis = analyze(&grid);
        assert_eq!(analysis.rooms.len(), 2);
        for room in &analysis.rooms {
            assert_eq!(room.size(), 9);
            // Every tile but the centre of a 3x3 room touches a wall.
            assert_eq!(room.edge_tiles.len(), 8);
            assert!(room.connected_rooms.is_empty());
        }
    }

    #[test]
    fn flood_fill_visits_each_tile_exactly_once() {
        let grid = TileGrid::new(30, 20, TileKind::Floor);
        let regions = regions_of(&grid, TileKind::Floor);
        assert_eq!(regions.len(), 1);
        let unique: BTreeSet<Pos> = regions[0].iter().copied().collect();
        assert_eq!(unique.len(), regions[0].len());
        assert_eq!(unique.len(), 28 * 18);
    }
}
