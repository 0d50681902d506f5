//! Per-archetype destination selection.
//!
//! Scatter and chase yield a destination cell that the movement engine steers
//! toward; frightened skips distance minimisation entirely and yields a
//! heading picked from a randomly rotated scan.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::{AgentKind, Cell, Direction, GhostMode, PlayerView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChaseStrategy {
    /// Player's current cell.
    Direct,
    /// `lead` cells ahead of the player, Right when the player is idle.
    Predictive { lead: i32 },
    /// Mirror of the partner ghost through a pivot `lead` cells ahead.
    Pincer { lead: i32 },
    /// Direct while farther than `radius`, scatter corner when closer.
    Shy { radius: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    Cell(Cell),
    Heading(Direction),
}

#[derive(Clone, Copy, Debug)]
pub struct TargetContext<'a> {
    pub grid: &'a Grid,
    pub player: PlayerView,
    pub partner: Option<Cell>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostBrain {
    pub chase: ChaseStrategy,
    pub scatter_corner: Cell,
}

pub fn resolve_scatter_corner(grid: &Grid, marker: char) -> Result<Cell, ConfigError> {
    grid.find_marker(marker).ok_or(ConfigError::MissingMarker {
        marker,
        purpose: "scatter corner",
    })
}

fn player_heading(player: &PlayerView) -> Direction {
    if player.dir.is_none() {
        Direction::Right
    } else {
        player.dir
    }
}

impl GhostBrain {
    pub fn new(chase: ChaseStrategy, scatter_corner: Cell) -> Self {
        Self {
            chase,
            scatter_corner,
        }
    }

    pub fn goal(
        &self,
        mode: GhostMode,
        me: Cell,
        heading: Direction,
        ctx: &TargetContext<'_>,
        rng: &mut Rng,
    ) -> Goal {
        if ctx.grid.is_house(me) {
            return Goal::Cell(ctx.grid.house_exit().unwrap_or(self.scatter_corner));
        }
        match mode {
            GhostMode::Scatter => Goal::Cell(self.scatter_corner),
            GhostMode::Chase => Goal::Cell(self.chase_target(me, ctx)),
            GhostMode::Frightened => Goal::Heading(frightened_heading(
                ctx.grid,
                me,
                AgentKind::Ghost,
                heading,
                rng,
            )),
            GhostMode::Returning => {
                Goal::Cell(ctx.grid.house_exit().unwrap_or(self.scatter_corner))
            }
        }
    }

    pub fn chase_target(&self, me: Cell, ctx: &TargetContext<'_>) -> Cell {
        let player = &ctx.player;
        match self.chase {
            ChaseStrategy::Direct => player.cell,
            ChaseStrategy::Predictive { lead } => player.cell.offset(player_heading(player), lead),
            ChaseStrategy::Pincer { lead } => {
                let pivot = player.cell.offset(player_heading(player), lead);
                match ctx.partner {
                    Some(partner) => Cell::new(
                        pivot.x.saturating_mul(2).saturating_sub(partner.x),
                        pivot.y.saturating_mul(2).saturating_sub(partner.y),
                    ),
                    None => pivot,
                }
            }
            ChaseStrategy::Shy { radius } => {
                if me.distance_sq(player.cell) > radius.saturating_mul(radius) {
                    player.cell
                } else {
                    self.scatter_corner
                }
            }
        }
    }
}

/// Scans the four headings starting from a random rotation and returns the
/// first open one that is not a reversal. The reversal is only returned when
/// it is the sole open heading.
pub fn frightened_heading(
    grid: &Grid,
    me: Cell,
    kind: AgentKind,
    heading: Direction,
    rng: &mut Rng,
) -> Direction {
    let start = rng.pick_index(Direction::PRIORITY.len());
    let reverse = heading.reverse();
    let mut reverse_open = false;
    for i in 0..Direction::PRIORITY.len() {
        let dir = Direction::PRIORITY[(start + i) % Direction::PRIORITY.len()];
        if !grid.can_step(me, dir, kind) {
            continue;
        }
        if Some(dir) == reverse {
            reverse_open = true;
            continue;
        }
        return dir;
    }
    match reverse {
        Some(dir) if reverse_open => dir,
        _ => Direction::None,
    }
}
