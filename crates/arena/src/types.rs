use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EntityId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn distance_squared(self, other: Pos) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    pub fn is_adjacent_to(self, other: Pos) -> bool {
        self != other && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    DetailA,
    DetailB,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        self != TileKind::Wall
    }

    pub fn code(self) -> u8 {
        match self {
            TileKind::Wall => 0,
            TileKind::Floor => 1,
            TileKind::DetailA => 2,
            TileKind::DetailB => 3,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::DetailA => ',',
            TileKind::DetailB => '~',
        }
    }
}

/// Horizontal position in world units; `z` is the second ground axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}
