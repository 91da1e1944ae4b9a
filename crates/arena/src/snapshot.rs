//! JSON export of a generated arena and its spawns.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mapgen::{GeneratedArena, GenerationReport};
use crate::spawns::{Spawn, Spawner};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub format_version: u32,
    pub seed: u64,
    pub fingerprint_hex: String,
    pub width: usize,
    pub height: usize,
    pub rooms_found: usize,
    pub passages_carved: usize,
    pub patches_skipped: usize,
    /// One string per row, using the ASCII map glyphs.
    pub rows: Vec<String>,
    pub spawns: Vec<Spawn>,
}

impl ArenaSnapshot {
    pub fn capture(arena: &GeneratedArena, spawner: &Spawner) -> Self {
        let GenerationReport { rooms_found, connectivity, detail, .. } = arena.report;
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            seed: arena.seed,
            fingerprint_hex: format!("{:#018x}", arena.grid.fingerprint()),
            width: arena.grid.width(),
            height: arena.grid.height(),
            rooms_found,
            passages_carved: connectivity.passages_carved,
            patches_skipped: detail.patches_skipped,
            rows: arena.grid.render_ascii().lines().map(str::to_owned).collect(),
            spawns: spawner.iter().map(|(_, spawn)| *spawn).collect(),
        }
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
