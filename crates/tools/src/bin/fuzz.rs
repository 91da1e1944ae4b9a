use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use arena::config::{ArenaConfig, PathSettings};
use arena::logging::init_tracing;
use arena::mapgen::ArenaGenerator;
use arena::pathfinding::PathfindingEngine;
use arena::spawns::Spawner;
use arena::{TileGrid, TileKind};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of arenas to generate and check
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
    #[arg(long, default_value = "warn")]
    log: String,
}

fn roll(rng: &mut ChaCha8Rng, min_value: u64, max_value: u64) -> u64 {
    min_value + rng.next_u64() % (max_value - min_value + 1)
}

fn random_config(rng: &mut ChaCha8Rng) -> ArenaConfig {
    ArenaConfig {
        width: roll(rng, 8, 96) as usize,
        height: roll(rng, 8, 96) as usize,
        fill_percent: roll(rng, 25, 65) as u8,
        smoothing_iterations: roll(rng, 0, 7) as u32,
        passage_width: roll(rng, 1, 3) as u32,
        enemy_count: roll(rng, 0, 6) as usize,
        ..ArenaConfig::default()
    }
}

fn check_border(grid: &TileGrid) -> Result<()> {
    for pos in grid.positions().filter(|&pos| grid.is_border(pos)) {
        ensure!(grid.tile_at(pos) == TileKind::Wall, "border tile {pos:?} is walkable");
    }
    Ok(())
}

fn check_connected(grid: &TileGrid) -> Result<()> {
    let walkable = grid.spawn_candidates();
    let Some(&anchor) = walkable.first() else {
        return Ok(());
    };
    let mut seen = vec![false; grid.tiles().len()];
    let mut pending = vec![anchor];
    let mut reached = 0;
    seen[grid.index(anchor)] = true;
    while let Some(pos) = pending.pop() {
        reached += 1;
        for next in grid.neighbors4(pos) {
            if grid.is_walkable(next) && !seen[grid.index(next)] {
                seen[grid.index(next)] = true;
                pending.push(next);
            }
        }
    }
    ensure!(reached == walkable.len(), "{} walkable tiles are cut off", walkable.len() - reached);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    println!("Starting arena fuzz from seed {} for {} runs...", args.seed, args.runs);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for run in 0..args.runs {
        let seed = rng.next_u64();
        let config = random_config(&mut rng);
        let label = format!(
            "run {run} seed {seed} {}x{} fill {} iterations {}",
            config.width, config.height, config.fill_percent, config.smoothing_iterations
        );
        let enemy_count = config.enemy_count;
        let generator = ArenaGenerator::new(config).with_context(|| label.clone())?;

        let mut spawner = Spawner::new(enemy_count);
        let arena = generator.generate_with(seed, &mut spawner);
        let again = generator.generate(seed);
        ensure!(arena.grid == again.grid, "{label}: generation is not deterministic");

        check_border(&arena.grid).with_context(|| label.clone())?;
        check_connected(&arena.grid).with_context(|| label.clone())?;
        ensure!(
            arena.report.connectivity.unreachable_rooms == 0,
            "{label}: rooms left unreachable"
        );

        let engine = PathfindingEngine::new(Arc::new(arena.grid), PathSettings::default());
        if let Some((_, player)) = spawner.player() {
            for (id, enemy) in spawner.enemies() {
                let result = engine.find_path(enemy.world, player.world);
                ensure!(result.success, "{label}: {id:?} cannot reach the player");
            }
        }
        debug!(run, seed, rooms = arena.report.rooms_found, "arena passed");
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
