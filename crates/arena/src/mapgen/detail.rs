//! Secondary terrain clusters stamped onto finished floor via random walks.
//!
//! Clusters are applied in request order and later walks overwrite earlier ones,
//! including detail tiles laid over freshly carved passages. Detail tiles stay
//! walkable, so this never affects connectivity.

use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::config::ClusterSpec;
use crate::grid::TileGrid;
use crate::types::{Pos, TileKind};

use super::seed::{STREAM_DETAIL, roll_below, roll_range, stream_rng};

pub const SEED_ATTEMPTS: usize = 20;

const WALK_DIRECTIONS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetailReport {
    pub patches_applied: usize,
    pub patches_skipped: usize,
}

pub fn detail(
    mut grid: TileGrid,
    clusters: &[ClusterSpec],
    seed: u64,
) -> (TileGrid, DetailReport) {
    let mut rng = stream_rng(seed, STREAM_DETAIL);
    let mut report = DetailReport::default();

    for cluster in clusters {
        if !cluster.tile.is_walkable() {
            warn!(?cluster, "skipping cluster that would stamp walls");
            report.patches_skipped += cluster.count as usize;
            continue;
        }
        for _ in 0..cluster.count {
            match pick_floor_seed(&grid, &mut rng) {
                Some(start) => {
                    random_walk(&mut grid, &mut rng, start, cluster);
                    report.patches_applied += 1;
                }
                None => {
                    warn!(tile = ?cluster.tile, "no floor tile found for cluster seed");
                    report.patches_skipped += 1;
                }
            }
        }
    }
    (grid, report)
}

fn pick_floor_seed(grid: &TileGrid, rng: &mut ChaCha8Rng) -> Option<Pos> {
    if grid.width() < 3 || grid.height() < 3 {
        return None;
    }
    (0..SEED_ATTEMPTS).find_map(|_| {
        let candidate = Pos {
            x: roll_range(rng, 1, grid.width() - 2) as i32,
            y: roll_range(rng, 1, grid.height() - 2) as i32,
        };
        (grid.tile_at(candidate) == TileKind::Floor).then_some(candidate)
    })
}

/// Walks may cross walls but never leave the interior; only non-wall tiles are stamped.
fn random_walk(grid: &mut TileGrid, rng: &mut ChaCha8Rng, start: Pos, cluster: &ClusterSpec) {
    let mut current = start;
    for _ in 0..cluster.patch_size {
        if grid.tile_at(current).is_walkable() {
            grid.set_tile(current, cluster.tile);
        }
        let (dx, dy) = WALK_DIRECTIONS[roll_below(rng, WALK_DIRECTIONS.len())];
        let next = Pos { y: current.y + dy, x: current.x + dx };
        if grid.is_interior(next) {
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(tile: TileKind, count: u32, patch_size: u32) -> ClusterSpec {
        ClusterSpec { tile, count, patch_size }
    }

    #[test]
    fn patches_only_touch_walkable_interior_tiles() {
        let mut grid = TileGrid::new(20, 12, TileKind::Floor);
        for y in 2..9 {
            grid.set_tile(Pos::new(9, y), TileKind::Wall);
        }
        let walls_before = grid.count(TileKind::Wall);

        let (detailed, report) = detail(grid, &[cluster(TileKind::DetailA, 4, 25)], 9);

        assert_eq!(report.patches_applied, 4);
        assert_eq!(detailed.count(TileKind::Wall), walls_before);
        assert!(detailed.count(TileKind::DetailA) > 0);
    }

    #[test]
    fn cluster_without_floor_is_skipped() {
        let grid = TileGrid::new(8, 8, TileKind::Wall);
        let (detailed, report) = detail(grid.clone(), &[cluster(TileKind::DetailB, 3, 10)], 1);
        assert_eq!(report, DetailReport { patches_applied: 0, patches_skipped: 3 });
        assert_eq!(detailed, grid);
    }

    #[test]
    fn later_walks_overwrite_earlier_detail() {
        let mut grid = TileGrid::new(5, 5, TileKind::Floor);
        let mut rng = stream_rng(4, STREAM_DETAIL);
        let centre = Pos::new(2, 2);

        random_walk(&mut grid, &mut rng, centre, &cluster(TileKind::DetailA, 1, 1));
        assert_eq!(grid.tile_at(centre), TileKind::DetailA);

        random_walk(&mut grid, &mut rng, centre, &cluster(TileKind::DetailB, 1, 1));
        assert_eq!(grid.tile_at(centre), TileKind::DetailB);
    }

    #[test]
    fn walks_stay_inside_the_border_ring() {
        let mut grid = TileGrid::new(6, 6, TileKind::Floor);
        let mut rng = stream_rng(11, STREAM_DETAIL);
        random_walk(&mut grid, &mut rng, Pos::new(1, 1), &cluster(TileKind::DetailB, 1, 500));
        for pos in grid.positions().filter(|&pos| grid.is_border(pos)) {
            assert_eq!(grid.tile_at(pos), TileKind::Wall);
        }
    }

    #[test]
    fn detailing_is_deterministic_per_seed() {
        let grid = TileGrid::new(30, 20, TileKind::Floor);
        let clusters = [cluster(TileKind::DetailA, 3, 30), cluster(TileKind::DetailB, 2, 15)];
        let (a, _) = detail(grid.clone(), &clusters, 77);
        let (b, _) = detail(grid, &clusters, 77);
        assert_eq!(a, b);
    }
}
