//! Actor placement on a finished arena.

use std::iter;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::grid::TileGrid;
use crate::mapgen::seed::{STREAM_SPAWNS, roll_below, stream_rng};
use crate::mapgen::{GeneratedArena, GenerationListener};
use crate::types::{EntityId, Pos, WorldPos};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Player,
    Sniper,
    Gunner,
}

impl SpawnKind {
    /// Enemy kinds alternate, starting with a sniper.
    pub fn enemy(ordinal: usize) -> Self {
        if ordinal % 2 == 0 { Self::Sniper } else { Self::Gunner }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub kind: SpawnKind,
    pub tile: Pos,
    pub world: WorldPos,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub placed: usize,
    pub skipped: usize,
}

/// Owns the id allocator for every actor placed in the current arena.
#[derive(Debug, Default)]
pub struct Spawner {
    enemy_count: usize,
    spawns: SlotMap<EntityId, Spawn>,
    player: Option<EntityId>,
    report: SpawnReport,
}

impl Spawner {
    pub fn new(enemy_count: usize) -> Self {
        Self { enemy_count, ..Self::default() }
    }

    /// Replaces all spawns with a fresh, seed-deterministic placement on `grid`.
    /// Each actor takes a distinct walkable tile; actors that find none are skipped.
    pub fn populate(&mut self, grid: &TileGrid, seed: u64) -> SpawnReport {
        self.spawns.clear();
        self.player = None;
        self.report = SpawnReport::default();

        let mut candidates = grid.spawn_candidates();
        let mut rng = stream_rng(seed, STREAM_SPAWNS);
        let kinds = iter::once(SpawnKind::Player)
            .chain((0..self.enemy_count).map(SpawnKind::enemy));

        for kind in kinds {
            if candidates.is_empty() {
                warn!(?kind, "no walkable tile left to spawn on");
                self.report.skipped += 1;
                continue;
            }
            let tile = candidates.swap_remove(roll_below(&mut rng, candidates.len()));
            let id = self.spawns.insert(Spawn { kind, tile, world: grid.grid_to_world(tile) });
            if kind == SpawnKind::Player {
                self.player = Some(id);
            }
            self.report.placed += 1;
        }
        debug!(placed = self.report.placed, skipped = self.report.skipped, "actors spawned");
        self.report
    }

    pub fn report(&self) -> SpawnReport {
        self.report
    }

    pub fn get(&self, id: EntityId) -> Option<&Spawn> {
        self.spawns.get(id)
    }

    pub fn player(&self) -> Option<(EntityId, &Spawn)> {
        let id = self.player?;
        self.spawns.get(id).map(|spawn| (id, spawn))
    }

    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &Spawn)> + '_ {
        self.spawns.iter().filter(|(_, spawn)| spawn.kind != SpawnKind::Player)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Spawn)> + '_ {
        self.spawns.iter()
    }

    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Spawn> {
        if self.player == Some(id) {
            self.player = None;
        }
        self.spawns.remove(id)
    }
}

impl GenerationListener for Spawner {
    fn on_generation_complete(&mut self, arena: &GeneratedArena) {
        self.populate(&arena.grid, arena.seed);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::config::ArenaConfig;
    use crate::mapgen::ArenaGenerator;
    use crate::types::TileKind;

    fn tiles(spawner: &Spawner) -> Vec<Pos> {
        let mut tiles: Vec<Pos> = spawner.iter().map(|(_, spawn)| spawn.tile).collect();
        tiles.sort();
        tiles
    }

    #[test]
    fn places_player_and_alternating_enemies_on_walkable_tiles() {
        let grid = TileGrid::new(12, 10, TileKind::Floor);
        let mut spawner = Spawner::new(3);

        let report = spawner.populate(&grid, 21);

        assert_eq!(report, SpawnReport { placed: 4, skipped: 0 });
        let (_, player) = spawner.player().expect("player placed");
        assert_eq!(player.kind, SpawnKind::Player);
        let mut kinds: Vec<SpawnKind> = spawner.enemies().map(|(_, spawn)| spawn.kind).collect();
        kinds.sort_by_key(|kind| *kind as u8);
        assert_eq!(kinds, vec![SpawnKind::Sniper, SpawnKind::Sniper, SpawnKind::Gunner]);
        for (_, spawn) in spawner.iter() {
            assert!(grid.is_walkable(spawn.tile));
            assert_eq!(grid.world_to_grid(spawn.world), spawn.tile);
        }
        let distinct: BTreeSet<Pos> = spawner.iter().map(|(_, spawn)| spawn.tile).collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn placement_is_deterministic_per_seed() {
        let grid = TileGrid::new(20, 20, TileKind::Floor);
        let mut a = Spawner::new(5);
        let mut b = Spawner::new(5);
        a.populate(&grid, 9);
        b.populate(&grid, 9);
        assert_eq!(tiles(&a), tiles(&b));
    }

    #[test]
    fn too_few_tiles_skips_the_remaining_actors() {
        let grid = TileGrid::from_ascii(&["#####", "#..##", "#####"]).expect("valid grid");
        let mut spawner = Spawner::new(3);
        assert_eq!(spawner.populate(&grid, 1), SpawnReport { placed: 2, skipped: 2 });
        assert!(spawner.player().is_some());
    }

    #[test]
    fn regeneration_replaces_previous_spawns() {
        let generator = ArenaGenerator::new(ArenaConfig::default()).expect("valid config");
        let mut spawner = Spawner::new(3);

        let first = generator.generate_with(4, &mut spawner);
        let (first_player, _) = spawner.player().expect("player placed");
        assert!(spawner.iter().all(|(_, spawn)| first.grid.is_walkable(spawn.tile)));

        let second = generator.generate_with(5, &mut spawner);
        assert_eq!(spawner.len(), 4);
        assert!(spawner.get(first_player).is_none());
        assert!(spawner.iter().all(|(_, spawn)| second.grid.is_walkable(spawn.tile)));
    }

    #[test]
    fn despawning_the_player_clears_the_handle() {
        let grid = TileGrid::new(6, 6, TileKind::Floor);
        let mut spawner = Spawner::new(0);
        spawner.populate(&grid, 3);
        let (id, _) = spawner.player().expect("player placed");
        assert!(spawner.despawn(id).is_some());
        assert!(spawner.player().is_none());
        assert!(spawner.is_empty());
    }
}
