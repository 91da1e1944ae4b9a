use std::collections::BTreeSet;

use crate::config::{MovementPenalties, Neighborhood};
use crate::grid::TileGrid;
use crate::types::Pos;

use super::scratch::SearchScratch;
use super::{PathNode, diagonal_distance, step_neighbors};

// Field order gives the open-set ordering: lowest f, then lowest h, then position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

impl OpenNode {
    fn new(f: u32, h: u32, pos: Pos) -> Self {
        Self { f, h, y: pos.y, x: pos.x }
    }
}

/// Weighted 8-connected search. Endpoints must already be validated.
pub(super) fn search(
    grid: &TileGrid,
    start: Pos,
    goal: Pos,
    penalties: &MovementPenalties,
) -> Option<Vec<Pos>> {
    let mut scratch = SearchScratch::for_grid(grid);
    let start_index = grid.index(start);
    let goal_index = grid.index(goal);

    let h = diagonal_distance(start, goal);
    let mut open_set = BTreeSet::from([OpenNode::new(h, h, start)]);
    {
        let node = scratch.node_mut(start_index);
        node.h_cost = h;
        node.open = true;
    }

    while let Some(entry) = open_set.pop_first() {
        let current = Pos { y: entry.y, x: entry.x };
        let current_index = grid.index(current);
        let state = scratch.node_mut(current_index);
        state.open = false;
        state.closed = true;
        let current_g = state.g_cost;
        if current_index == goal_index {
            return Some(scratch.retrace(grid, start_index, goal_index));
        }

        for (next, step) in step_neighbors(grid, current, Neighborhood::Eight) {
            let index = grid.index(next);
            let node = PathNode::at(grid, next, penalties);
            if !node.walkable || scratch.node(index).closed {
                continue;
            }
            let tentative = current_g + step + node.movement_penalty;
            let neighbor = *scratch.node(index);
            if neighbor.open && tentative >= neighbor.g_cost {
                continue;
            }
            if neighbor.open {
                open_set.remove(&OpenNode::new(neighbor.f_cost(), neighbor.h_cost, next));
            }
            let h = diagonal_distance(next, goal);
            let node = scratch.node_mut(index);
            node.g_cost = tentative;
            node.h_cost = h;
            node.parent = Some(current_index);
            node.open = true;
            open_set.insert(OpenNode::new(tentative + h, h, next));
        }
    }
    None
}
