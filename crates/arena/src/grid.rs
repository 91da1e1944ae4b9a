//! Tile storage, coordinate conventions, and world-space mapping for generated arenas.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Pos, TileKind, WorldPos};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// A grid filled with `fill` everywhere except the border ring, which is always `Wall`.
    pub fn new(width: usize, height: usize, fill: TileKind) -> Self {
        let mut grid = Self { width, height, tiles: vec![fill; width * height] };
        for y in 0..height {
            for x in 0..width {
                let pos = Pos::new(x as i32, y as i32);
                if grid.is_border(pos) {
                    let index = grid.index(pos);
                    grid.tiles[index] = TileKind::Wall;
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0
            || pos.y == 0
            || pos.x as usize == self.width.saturating_sub(1)
            || pos.y as usize == self.height.saturating_sub(1)
    }

    pub fn is_interior(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && !self.is_border(pos)
    }

    /// Out-of-bounds positions read as `Wall`.
    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.tiles[self.index(pos)]
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile_at(pos).is_walkable()
    }

    /// Writes are ignored outside the interior so the border ring stays intact.
    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if !self.is_interior(pos) {
            return;
        }
        let index = self.index(pos);
        self.tiles[index] = tile;
    }

    pub fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| Pos::new(x as i32, y as i32)))
    }

    pub fn count(&self, tile: TileKind) -> usize {
        self.tiles.iter().filter(|&&candidate| candidate == tile).count()
    }

    pub fn neighbors4(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        [
            Pos { y: pos.y - 1, x: pos.x },
            Pos { y: pos.y, x: pos.x + 1 },
            Pos { y: pos.y + 1, x: pos.x },
            Pos { y: pos.y, x: pos.x - 1 },
        ]
        .into_iter()
        .filter(move |next| self.in_bounds(*next))
    }

    /// Counts `Wall` tiles among the eight surrounding positions, treating out-of-bounds as wall.
    pub fn wall_neighbor_count(&self, pos: Pos) -> u8 {
        let mut walls = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.tile_at(Pos { y: pos.y + dy, x: pos.x + dx }) == TileKind::Wall {
                    walls += 1;
                }
            }
        }
        walls
    }

    pub fn world_origin(&self) -> (i32, i32) {
        (-((self.width / 2) as i32), -((self.height / 2) as i32))
    }

    pub fn grid_to_world(&self, pos: Pos) -> WorldPos {
        let (origin_x, origin_z) = self.world_origin();
        WorldPos { x: (pos.x + origin_x) as f32, z: (pos.y + origin_z) as f32 }
    }

    /// Maps a world position to the nearest tile. The result may lie outside the grid.
    pub fn world_to_grid(&self, world: WorldPos) -> Pos {
        let (origin_x, origin_z) = self.world_origin();
        Pos {
            y: (world.z - origin_z as f32).round() as i32,
            x: (world.x - origin_x as f32).round() as i32,
        }
    }

    pub fn spawn_candidates(&self) -> Vec<Pos> {
        self.positions().filter(|&pos| self.is_walkable(pos)).collect()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.tiles.len());
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.tiles.iter().map(|tile| tile.code()));
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.tile_at(Pos::new(x as i32, y as i32)).glyph());
            }
            out.push('\n');
        }
        out
    }

    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<TileKind>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self { width, height, tiles }
    }

    /// Test and tooling helper: parses rows of `#`, `.`, `,` and `~` glyphs.
    pub fn from_ascii(rows: &[&str]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut tiles = Vec::with_capacity(width * height);
        for row in rows {
            if row.chars().count() != width {
                return None;
            }
            for glyph in row.chars() {
                tiles.push(match glyph {
                    '#' => TileKind::Wall,
                    '.' => TileKind::Floor,
                    ',' => TileKind::DetailA,
                    '~' => TileKind::DetailB,
                    _ => return None,
                });
            }
        }
        Some(Self { width, height, tiles })
    }
}

pub fn tile_at(grid: &TileGrid, x: i32, y: i32) -> TileKind {
    grid.tile_at(Pos::new(x, y))
}

pub fn is_walkable(grid: &TileGrid, x: i32, y: i32) -> bool {
    grid.is_walkable(Pos::new(x, y))
}
