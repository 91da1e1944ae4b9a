use std::collections::VecDeque;

use crate::config::{MovementPenalties, Neighborhood};
use crate::grid::TileGrid;
use crate::types::Pos;

use super::scratch::SearchScratch;
use super::{PathNode, step_neighbors};

/// Unweighted breadth-first search; stops on the first dequeue of `goal`.
/// Endpoints must already be validated.
pub(super) fn search(
    grid: &TileGrid,
    start: Pos,
    goal: Pos,
    neighborhood: Neighborhood,
) -> Option<Vec<Pos>> {
    let unweighted = MovementPenalties::uniform();
    let mut scratch = SearchScratch::for_grid(grid);
    let start_index = grid.index(start);
    let goal_index = grid.index(goal);
    let mut queue = VecDeque::from([start_index]);
    scratch.node_mut(start_index).closed = true;

    while let Some(current) = queue.pop_front() {
        if current == goal_index {
            return Some(scratch.retrace(grid, start_index, goal_index));
        }
        for (next, _) in step_neighbors(grid, grid.pos_of(current), neighborhood) {
            let index = grid.index(next);
            if !PathNode::at(grid, next, &unweighted).walkable || scratch.node(index).closed {
                continue;
            }
            let node = scratch.node_mut(index);
            node.closed = true;
            node.parent = Some(current);
            queue.push_back(index);
        }
    }
    None
}
