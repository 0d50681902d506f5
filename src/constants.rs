use crate::types::GhostMode;

pub const TICK_RATE: u32 = 60;

/// Distance to a tile center under which an agent counts as "on" it.
pub const CENTER_EPSILON: f32 = 0.001;
pub const CELL_SIZE: f32 = 1.0;

pub const PLAYER_BASE_SPEED: f32 = 5.0;
pub const FRIGHTENED_DURATION_SEC: f32 = 6.0;

pub const NORMAL_SPEED_MULTIPLIER: f32 = 0.75;
pub const FRIGHTENED_SPEED_MULTIPLIER: f32 = 0.5;
pub const HOUSE_SPEED_MULTIPLIER: f32 = 0.45;
pub const TUNNEL_SPEED_MULTIPLIER: f32 = 0.4;

pub const PREDICTIVE_LEAD_CELLS: i32 = 4;
pub const PINCER_LEAD_CELLS: i32 = 2;
pub const SHY_RADIUS_CELLS: i32 = 8;
pub const MAX_STRATEGY_CELLS: i32 = 1024;

/// Undrained runtime events kept before the oldest are dropped.
pub const MAX_PENDING_EVENTS: usize = 4096;

pub fn classic_phase_table() -> Vec<(GhostMode, f32)> {
    vec![
        (GhostMode::Scatter, 7.0),
        (GhostMode::Chase, 20.0),
        (GhostMode::Scatter, 7.0),
        (GhostMode::Chase, 20.0),
        (GhostMode::Scatter, 5.0),
        (GhostMode::Chase, 20.0),
        (GhostMode::Scatter, 5.0),
    ]
}
