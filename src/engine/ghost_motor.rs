use crate::config::SpeedProfile;
use crate::constants::CENTER_EPSILON;
use crate::grid::Grid;
use crate::rng::Rng;
use crate::targeting::{GhostBrain, Goal, TargetContext};
use crate::types::{Cell, Direction, GhostMode, ModeChange, WorldPos};

use super::utils::{choose_direction_toward, speed_multiplier};

/// Continuous tile-to-tile motion of one pursuing ghost. `target_cell` is the
/// committed next cell; decisions are only taken once `position` sits on its
/// center.
#[derive(Clone, Debug)]
pub struct GhostMotor {
    pub position: WorldPos,
    pub direction: Direction,
    pub target_cell: Cell,
}

impl GhostMotor {
    pub fn spawn(grid: &Grid, at: WorldPos, direction: Direction) -> Self {
        let cell = grid.cell_of(at);
        Self {
            position: grid.world_center_of(cell),
            direction,
            target_cell: cell,
        }
    }

    pub fn current_cell(&self, grid: &Grid) -> Cell {
        grid.cell_of(self.position)
    }

    pub fn at_decision_point(&self, grid: &Grid) -> bool {
        self.position.distance(grid.world_center_of(self.target_cell)) < CENTER_EPSILON
    }

    pub fn can_move(&self, grid: &Grid, dir: Direction) -> bool {
        let cell = self.current_cell(grid);
        grid.can_step(cell, dir, grid.ghost_kind_at(cell))
    }

    /// Takes `desired` when open, otherwise keeps the current heading while it
    /// stays open, otherwise stops.
    pub fn commit(&mut self, grid: &Grid, desired: Direction) {
        self.position = grid.world_center_of(self.target_cell);
        if self.can_move(grid, desired) {
            self.direction = desired;
        }
        if !self.can_move(grid, self.direction) {
            self.direction = Direction::None;
        }
        if !self.direction.is_none() {
            self.target_cell = self.current_cell(grid).step(self.direction);
        }
    }

    pub fn advance(&mut self, grid: &Grid, dt: f32, speed: f32) {
        let target = grid.world_center_of(self.target_cell);
        self.position = self.position.move_towards(target, speed * dt);
    }

    /// Scatter/Chase flips turn the ghost around on the spot when the
    /// reversal is open. Returns whether it turned.
    pub fn on_mode_changed(&mut self, grid: &Grid, change: ModeChange) -> bool {
        if !change.is_scatter_chase_flip() {
            return false;
        }
        let Some(reversed) = self.direction.reverse() else {
            return false;
        };
        if !self.can_move(grid, reversed) {
            return false;
        }
        self.direction = reversed;
        self.target_cell = self.current_cell(grid).step(reversed);
        true
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub name: String,
    pub brain: GhostBrain,
    pub motor: GhostMotor,
    pub home: Cell,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct GhostStepParams<'a> {
    pub mode: GhostMode,
    pub base_speed: f32,
    pub profile: &'a SpeedProfile,
    pub dt: f32,
}

impl Ghost {
    pub(crate) fn step(
        &mut self,
        ctx: &TargetContext<'_>,
        params: GhostStepParams<'_>,
        rng: &mut Rng,
    ) {
        let grid = ctx.grid;
        if self.motor.at_decision_point(grid) {
            let me = self.motor.target_cell;
            let heading = self.motor.direction;
            let desired = match self.brain.goal(params.mode, me, heading, ctx, rng) {
                Goal::Cell(target) => {
                    choose_direction_toward(grid, me, grid.ghost_kind_at(me), heading, target)
                }
                Goal::Heading(dir) => dir,
            };
            self.motor.commit(grid, desired);
            tracing::trace!(
                ghost = %self.name,
                x = me.x,
                y = me.y,
                ?desired,
                committed = ?self.motor.direction,
                "tile decision"
            );
        }

        let cell = self.motor.current_cell(grid);
        let speed = params.base_speed * speed_multiplier(grid, cell, params.mode, params.profile);
        self.motor.advance(grid, params.dt, speed);
    }
}
