use crate::config::SpeedProfile;
use crate::grid::Grid;
use crate::types::{AgentKind, Cell, Direction, GhostMode};

// Ties keep the earlier `Direction::PRIORITY` entry.
pub(crate) fn choose_direction_toward(
    grid: &Grid,
    me: Cell,
    kind: AgentKind,
    heading: Direction,
    target: Cell,
) -> Direction {
    let reverse = heading.reverse();
    let mut best_dir = Direction::None;
    let mut best_dist = i32::MAX;

    for dir in Direction::PRIORITY {
        if Some(dir) == reverse {
            continue;
        }
        if !grid.can_step(me, dir, kind) {
            continue;
        }
        let dist = me.step(dir).distance_sq(target);
        if dist < best_dist {
            best_dist = dist;
            best_dir = dir;
        }
    }

    if best_dir.is_none() {
        if let Some(rev) = reverse {
            if grid.can_step(me, rev, kind) {
                return rev;
            }
        }
    }
    best_dir
}

pub(crate) fn speed_multiplier(
    grid: &Grid,
    cell: Cell,
    mode: GhostMode,
    profile: &SpeedProfile,
) -> f32 {
    if grid.is_house(cell) {
        return profile.house;
    }
    if grid.is_tunnel(cell) {
        return profile.tunnel;
    }
    if mode == GhostMode::Frightened {
        return profile.frightened;
    }
    profile.normal
}
