use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::types::Cell;

/// Power pellets still on the board. Taken pellets never come back.
#[derive(Clone, Debug, Default)]
pub struct PelletSystem {
    remaining: BTreeSet<Cell>,
}

impl PelletSystem {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            remaining: grid.power_pellets().iter().copied().collect(),
        }
    }

    pub fn take_at(&mut self, cell: Cell) -> bool {
        self.remaining.remove(&cell)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.remaining.contains(&cell)
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}
