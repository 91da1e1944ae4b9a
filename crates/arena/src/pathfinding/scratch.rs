//! Per-query search state, indexed by tile and never shared between searches.

use crate::grid::TileGrid;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct NodeState {
    pub(super) g_cost: u32,
    pub(super) h_cost: u32,
    pub(super) parent: Option<usize>,
    pub(super) open: bool,
    pub(super) closed: bool,
}

impl NodeState {
    pub(super) fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}

pub(super) struct SearchScratch {
    nodes: Vec<NodeState>,
}

impl SearchScratch {
    pub(super) fn for_grid(grid: &TileGrid) -> Self {
        Self { nodes: vec![NodeState::default(); grid.tiles().len()] }
    }

    pub(super) fn node(&self, index: usize) -> &NodeState {
        &self.nodes[index]
    }

    pub(super) fn node_mut(&mut self, index: usize) -> &mut NodeState {
        &mut self.nodes[index]
    }

    /// Follows parent links from `goal` back to `start`; the result excludes `start`.
    pub(super) fn retrace(&self, grid: &TileGrid, start: usize, goal: usize) -> Vec<Pos> {
        let mut path = Vec::new();
        let mut current = goal;
        while current != start {
            path.push(grid.pos_of(current));
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
