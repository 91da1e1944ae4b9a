//! Room-graph connectivity repair: carves passages until every room is reachable from
//! the main room.

use tracing::debug;

use crate::grid::TileGrid;
use crate::types::{Pos, TileKind};

use super::regions::Room;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Candidate {
    distance: i64,
    room_a: usize,
    room_b: usize,
    tile_a: Pos,
    tile_b: Pos,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub passages_carved: usize,
    pub unreachable_rooms: usize,
}

/// Connects `rooms` in place on `grid`. Rooms are re-ordered by descending size, so
/// `rooms[0]` is the main room afterwards.
pub fn connect(
    mut grid: TileGrid,
    rooms: &mut Vec<Room>,
    passage_width: u32,
) -> (TileGrid, ConnectivityReport) {
    let mut report = ConnectivityReport::default();
    if rooms.is_empty() {
        return (grid, report);
    }

    rooms.sort_by(|a, b| b.size().cmp(&a.size()));
    rooms[0].is_main_room = true;
    rooms[0].is_accessible_from_main_room = true;

    for room_a in 0..rooms.len() {
        if !rooms[room_a].connected_rooms.is_empty() {
            continue;
        }
        if let Some(candidate) = closest_pair_for(rooms, room_a) {
            carve_candidate(&mut grid, rooms, candidate, passage_width);
            report.passages_carved += 1;
        }
    }
    debug!(passages = report.passages_carved, "greedy room connection finished");

    while rooms.iter().any(|room| !room.is_accessible_from_main_room) {
        let Some(candidate) = closest_accessibility_pair(rooms) else {
            break;
        };
        carve_candidate(&mut grid, rooms, candidate, passage_width);
        report.passages_carved += 1;
    }

    report.unreachable_rooms =
        rooms.iter().filter(|room| !room.is_accessible_from_main_room).count();
    (grid, report)
}

fn closest_pair_for(rooms: &[Room], room_a: usize) -> Option<Candidate> {
    let mut best = None;
    for room_b in 0..rooms.len() {
        if room_b == room_a || rooms[room_a].is_connected(room_b) {
            continue;
        }
        best = closer_candidate(best, &rooms[room_a], &rooms[room_b], room_a, room_b);
    }
    best
}

fn closest_accessibility_pair(rooms: &[Room]) -> Option<Candidate> {
    let mut best = None;
    for (room_a, a) in rooms.iter().enumerate() {
        if a.is_accessible_from_main_room {
            continue;
        }
        for (room_b, b) in rooms.iter().enumerate() {
            if !b.is_accessible_from_main_room || a.is_connected(room_b) {
                continue;
            }
            best = closer_candidate(best, a, b, room_a, room_b);
        }
    }
    best
}

/// Only a strictly shorter pair replaces `best`, so ties keep the first pair seen.
fn closer_candidate(
    mut best: Option<Candidate>,
    a: &Room,
    b: &Room,
    room_a: usize,
    room_b: usize,
) -> Option<Candidate> {
    for &tile_a in &a.edge_tiles {
        for &tile_b in &b.edge_tiles {
            let distance = tile_a.distance_squared(tile_b);
            if best.is_none_or(|current: Candidate| distance < current.distance) {
                best = Some(Candidate { distance, room_a, room_b, tile_a, tile_b });
            }
        }
    }
    best
}

fn carve_candidate(grid: &mut TileGrid, rooms: &mut [Room], candidate: Candidate, width: u32) {
    link_rooms(rooms, candidate.room_a, candidate.room_b);
    carve_passage(grid, candidate.tile_a, candidate.tile_b, width);
}

fn link_rooms(rooms: &mut [Room], room_a: usize, room_b: usize) {
    if rooms[room_a].is_accessible_from_main_room {
        mark_accessible(rooms, room_b);
    } else if rooms[room_b].is_accessible_from_main_room {
        mark_accessible(rooms, room_a);
    }
    rooms[room_a].connected_rooms.insert(room_b);
    rooms[room_b].connected_rooms.insert(room_a);
}

fn mark_accessible(rooms: &mut [Room], start: usize) {
    let mut pending = vec![start];
    while let Some(index) = pending.pop() {
        if rooms[index].is_accessible_from_main_room {
            continue;
        }
        rooms[index].is_accessible_from_main_room = true;
        pending.extend(rooms[index].connected_rooms.iter().copied());
    }
}

/// Stamps a disc of `radius` floor at every point of the line from `from` to `to`.
pub fn carve_passage(grid: &mut TileGrid, from: Pos, to: Pos, radius: u32) {
    // A zero radius would leave diagonal-only gaps that 4-connected movement can't cross.
    let radius = radius.max(1) as i32;
    let radius_squared = radius * radius;
    for point in line(from, to) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius_squared {
                    grid.set_tile(Pos { y: point.y + dy, x: point.x + dx }, TileKind::Floor);
                }
            }
        }
    }
}

/// Integer Bresenham line, both endpoints included.
pub fn line(from: Pos, to: Pos) -> Vec<Pos> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let step_x = if from.x < to.x { 1 } else { -1 };
    let step_y = if from.y < to.y { 1 } else { -1 };
    let mut error = dx + dy;
    let mut current = from;
    let mut points = Vec::with_capacity((dx - dy) as usize + 1);

    loop {
        points.push(current);
        if current == to {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            current.x += step_x;
        }
        if doubled <= dx {
            error += dx;
            current.y += step_y;
        }
    }
    points
}
