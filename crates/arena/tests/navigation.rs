use std::sync::Arc;
use std::time::Duration;

use arena::config::{MovementPenalties, Neighborhood, PathSettings, SearchMode};
use arena::mapgen::ArenaGenerator;
use arena::mapgen::connectivity::connect;
use arena::mapgen::regions::{analyze, regions_of};
use arena::pathfinding::{PathListener, PathService, PathfindingEngine, astar_path, bfs_path};
use arena::spawns::Spawner;
use arena::{ArenaConfig, EntityId, Pos, TileGrid, TileKind, WorldPos};

#[derive(Default)]
struct Inbox {
    paths: Vec<(EntityId, Vec<WorldPos>, bool)>,
}

impl PathListener for Inbox {
    fn on_path_found(&mut self, requester: EntityId, waypoints: &[WorldPos], success: bool) {
        self.paths.push((requester, waypoints.to_vec(), success));
    }
}

#[test]
fn test_every_room_reaches_every_other_room_after_generation() {
    let generator = ArenaGenerator::new(ArenaConfig::default()).expect("valid config");
    for seed in [11_u64, 12, 13] {
        let grid = generator.generate(seed).grid;
        let regions = regions_of(&grid, TileKind::Floor);
        let anchors: Vec<Pos> =
            regions.iter().filter_map(|region| region.first().copied()).collect();
        let Some((&first, rest)) = anchors.split_first() else {
            continue;
        };
        for &other in rest {
            let path = bfs_path(&grid, first, other, Neighborhood::Four);
            assert!(path.is_ok(), "seed={seed}: {first:?} cannot reach {other:?}");
        }
    }
}

#[test]
fn test_two_three_by_three_rooms_are_joined_by_one_passage() {
    let grid = TileGrid::from_ascii(&[
        "###########", //
        "#...###...#",
        "#...###...#",
        "#...###...#",
        "###########",
    ])
    .expect("valid grid");
    let analysis = analyze(&grid);
    let mut rooms = analysis.rooms;
    let (connected, report) = connect(analysis.grid, &mut rooms, 1);

    assert_eq!(report.passages_carved, 1);
    let penalties = MovementPenalties::default();
    let path = astar_path(&connected, Pos::new(2, 2), Pos::new(8, 2), &penalties)
        .expect("rooms are mutually reachable");
    assert_eq!(path.last(), Some(&Pos::new(8, 2)));
}

#[test]
fn test_spawned_actors_can_path_to_the_player() {
    let generator = ArenaGenerator::new(ArenaConfig::default()).expect("valid config");
    let mut spawner = Spawner::new(3);
    let arena = generator.generate_with(404, &mut spawner);

    let engine = PathfindingEngine::new(Arc::new(arena.grid), PathSettings::default());
    let service = PathService::new(engine).expect("worker pool");
    let (_, player) = spawner.player().expect("player placed");
    let enemies: Vec<EntityId> = spawner.enemies().map(|(id, _)| id).collect();
    for (id, enemy) in spawner.enemies() {
        service.request(id, enemy.world, player.world);
    }

    let mut inbox = Inbox::default();
    let delivered = service.dispatch_until_idle(&mut inbox, Duration::from_secs(30));

    assert_eq!(delivered, enemies.len());
    for (requester, waypoints, success) in &inbox.paths {
        assert!(enemies.contains(requester));
        assert!(*success, "{requester:?} found no path");
        assert_eq!(waypoints.last(), Some(&player.world));
    }
}

#[test]
fn test_breadth_first_and_astar_agree_on_reachability() {
    let generator = ArenaGenerator::new(ArenaConfig::default()).expect("valid config");
    let grid = Arc::new(generator.generate(99).grid);
    let candidates = grid.spawn_candidates();
    let bfs = PathfindingEngine::new(
        Arc::clone(&grid),
        PathSettings { mode: SearchMode::BreadthFirst, ..PathSettings::default() },
    );
    let astar = PathfindingEngine::new(Arc::clone(&grid), PathSettings::default());

    let start = grid.grid_to_world(candidates[0]);
    for &goal in candidates.iter().step_by(97) {
        let goal = grid.grid_to_world(goal);
        assert_eq!(bfs.find_path(start, goal).success, astar.find_path(start, goal).success);
    }
    let outside = WorldPos::new(10_000.0, 10_000.0);
    assert!(!bfs.find_path(start, outside).success);
    assert!(!astar.find_path(outside, start).success);
}
