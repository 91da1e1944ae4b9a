//! Cellular-automaton cave synthesis: random fill followed by majority smoothing.

use crate::grid::TileGrid;
use crate::types::{Pos, TileKind};

use super::seed::{STREAM_AUTOMATON, roll_below, stream_rng};

pub fn generate(
    width: usize,
    height: usize,
    seed: u64,
    fill_percent: u8,
    iterations: u32,
) -> TileGrid {
    let mut grid = random_fill(width, height, seed, fill_percent.min(100));
    for _ in 0..iterations {
        grid = smooth(&grid);
    }
    grid
}

fn random_fill(width: usize, height: usize, seed: u64, fill_percent: u8) -> TileGrid {
    let mut rng = stream_rng(seed, STREAM_AUTOMATON);
    let mut grid = TileGrid::new(width, height, TileKind::Floor);
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if roll_below(&mut rng, 100) < usize::from(fill_percent) {
                grid.set_tile(Pos::new(x as i32, y as i32), TileKind::Wall);
            }
        }
    }
    grid
}

/// One generation of the 4-5 rule; reads only `previous`, so every tile sees the same state.
fn smooth(previous: &TileGrid) -> TileGrid {
    let mut next = previous.tiles().to_vec();
    for (index, slot) in next.iter_mut().enumerate() {
        let pos = previous.pos_of(index);
        let walls = previous.wall_neighbor_count(pos);
        if walls > 4 {
            *slot = TileKind::Wall;
        } else if walls < 4 {
            *slot = TileKind::Floor;
        }
    }
    TileGrid::from_tiles(previous.width(), previous.height(), next)
}
