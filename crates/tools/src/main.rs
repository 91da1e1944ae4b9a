use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arena::config::ArenaConfig;
use arena::logging::init_tracing;
use arena::mapgen::ArenaGenerator;
use arena::pathfinding::PathfindingEngine;
use arena::snapshot::ArenaSnapshot;
use arena::spawns::{SpawnKind, Spawner};
use arena::{Pos, TileGrid};
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Generate an arena and inspect it", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// TOML arena config; individual flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    #[arg(long)]
    fill: Option<u8>,
    #[arg(long)]
    iterations: Option<u32>,
    #[arg(long)]
    passage_width: Option<u32>,
    /// Tile path query, `x0,y0:x1,y1`
    #[arg(long, value_parser = parse_query)]
    path: Option<(Pos, Pos)>,
    /// Write a JSON snapshot of the arena and its spawns
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Skip printing the map
    #[arg(long)]
    no_map: bool,
    #[arg(long, default_value = "info")]
    log: String,
}

fn parse_pos(text: &str) -> Result<Pos, String> {
    let (x, y) = text.split_once(',').ok_or_else(|| format!("expected `x,y`, got `{text}`"))?;
    let x = x.trim().parse().map_err(|_| format!("bad x coordinate `{x}`"))?;
    let y = y.trim().parse().map_err(|_| format!("bad y coordinate `{y}`"))?;
    Ok(Pos::new(x, y))
}

fn parse_query(text: &str) -> Result<(Pos, Pos), String> {
    let (start, goal) =
        text.split_once(':').ok_or_else(|| format!("expected `x0,y0:x1,y1`, got `{text}`"))?;
    Ok((parse_pos(start)?, parse_pos(goal)?))
}

fn resolve_config(args: &Args) -> Result<ArenaConfig> {
    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path)
            .with_context(|| format!("Failed to load arena config: {}", path.display()))?,
        None => ArenaConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(fill) = args.fill {
        config.fill_percent = fill;
    }
    if let Some(iterations) = args.iterations {
        config.smoothing_iterations = iterations;
    }
    if let Some(passage_width) = args.passage_width {
        config.passage_width = passage_width;
    }
    Ok(config)
}

fn render_with_path(grid: &TileGrid, path: &[Pos], spawner: &Spawner) -> String {
    let mut rows: Vec<Vec<char>> =
        grid.render_ascii().lines().map(|row| row.chars().collect()).collect();
    let mut mark = |pos: Pos, glyph: char| {
        if let Some(cell) =
            rows.get_mut(pos.y as usize).and_then(|row| row.get_mut(pos.x as usize))
        {
            *cell = glyph;
        }
    };
    for &pos in path {
        mark(pos, '*');
    }
    for (_, spawn) in spawner.iter() {
        mark(spawn.tile, if spawn.kind == SpawnKind::Player { '@' } else { 'E' });
    }
    rows.into_iter().map(|row| row.into_iter().collect::<String>() + "\n").collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let config = resolve_config(&args)?;
    let enemy_count = config.enemy_count;
    let path_settings = config.path;
    let generator = ArenaGenerator::new(config).context("Invalid arena config")?;
    let mut spawner = Spawner::new(enemy_count);
    let arena = generator.generate_with(args.seed, &mut spawner);

    let mut path = Vec::new();
    if let Some((start, goal)) = args.path {
        let engine = PathfindingEngine::new(Arc::new(arena.grid.clone()), path_settings);
        match engine.find_tile_path(start, goal) {
            Ok(tiles) => {
                println!("Path: {} steps from {start:?} to {goal:?}", tiles.len());
                path = tiles;
            }
            Err(err) if err.is_invalid_query() => bail!("Invalid path query: {err}"),
            Err(err) => println!("Path: none ({err})"),
        }
    }

    if !args.no_map {
        print!("{}", render_with_path(&arena.grid, &path, &spawner));
    }

    let report = arena.report;
    println!("Seed: {}", arena.seed);
    println!("Size: {}x{}", arena.grid.width(), arena.grid.height());
    println!("Fingerprint: {:#018x}", arena.grid.fingerprint());
    println!(
        "Rooms: {} (pruned {} wall regions), passages carved: {}",
        report.rooms_found, report.wall_regions_pruned, report.connectivity.passages_carved
    );
    println!(
        "Detail patches: {} applied, {} skipped",
        report.detail.patches_applied, report.detail.patches_skipped
    );
    println!("Spawns: {} placed, {} skipped", spawner.report().placed, spawner.report().skipped);

    if let Some(path) = &args.snapshot {
        ArenaSnapshot::capture(&arena, &spawner)
            .write_atomic(path)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        println!("Snapshot written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_queries_parse() {
        assert_eq!(parse_query("1,2:30,4"), Ok((Pos::new(1, 2), Pos::new(30, 4))));
        assert_eq!(parse_query(" 5, 6 : 7 ,8"), Ok((Pos::new(5, 6), Pos::new(7, 8))));
        assert!(parse_query("1,2").is_err());
        assert!(parse_query("a,2:3,4").is_err());
    }

    #[test]
    fn flags_override_config_values() {
        let args = Args::parse_from(["tools", "--width", "30", "--fill", "40"]);
        let config = resolve_config(&args).expect("defaults resolve");
        assert_eq!(config.width, 30);
        assert_eq!(config.fill_percent, 40);
        assert_eq!(config.height, ArenaConfig::default().height);
    }
}
