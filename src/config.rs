use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    classic_phase_table, FRIGHTENED_DURATION_SEC, FRIGHTENED_SPEED_MULTIPLIER,
    HOUSE_SPEED_MULTIPLIER, MAX_STRATEGY_CELLS, NORMAL_SPEED_MULTIPLIER, PINCER_LEAD_CELLS,
    PLAYER_BASE_SPEED, PREDICTIVE_LEAD_CELLS, SHY_RADIUS_CELLS, TICK_RATE,
    TUNNEL_SPEED_MULTIPLIER,
};
use crate::error::ConfigError;
use crate::targeting::ChaseStrategy;
use crate::types::{Direction, GhostMode};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub mode: GhostMode,
    pub duration: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeedProfile {
    pub normal: f32,
    pub frightened: f32,
    pub house: f32,
    pub tunnel: f32,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            normal: NORMAL_SPEED_MULTIPLIER,
            frightened: FRIGHTENED_SPEED_MULTIPLIER,
            house: HOUSE_SPEED_MULTIPLIER,
            tunnel: TUNNEL_SPEED_MULTIPLIER,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostConfig {
    pub name: String,
    pub strategy: ChaseStrategy,
    pub spawn_marker: char,
    pub scatter_marker: char,
    #[serde(default = "default_initial_direction")]
    pub initial_direction: Direction,
}

fn default_initial_direction() -> Direction {
    Direction::Right
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub tick_rate: u32,
    pub phases: Vec<PhaseConfig>,
    pub frightened_duration: f32,
    pub player_speed: f32,
    pub speed: SpeedProfile,
    pub ghosts: Vec<GhostConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            phases: classic_phase_table()
                .into_iter()
                .map(|(mode, duration)| PhaseConfig { mode, duration })
                .collect(),
            frightened_duration: FRIGHTENED_DURATION_SEC,
            player_speed: PLAYER_BASE_SPEED,
            speed: SpeedProfile::default(),
            ghosts: classic_roster(),
        }
    }
}

pub fn classic_roster() -> Vec<GhostConfig> {
    vec![
        GhostConfig {
            name: "blinky".to_string(),
            strategy: ChaseStrategy::Direct,
            spawn_marker: 'B',
            scatter_marker: 'b',
            initial_direction: Direction::Left,
        },
        GhostConfig {
            name: "pinky".to_string(),
            strategy: ChaseStrategy::Predictive {
                lead: PREDICTIVE_LEAD_CELLS,
            },
            spawn_marker: '2',
            scatter_marker: 'a',
            initial_direction: Direction::Up,
        },
        GhostConfig {
            name: "inky".to_string(),
            strategy: ChaseStrategy::Pincer {
                lead: PINCER_LEAD_CELLS,
            },
            spawn_marker: '1',
            scatter_marker: 'd',
            initial_direction: Direction::Right,
        },
        GhostConfig {
            name: "clyde".to_string(),
            strategy: ChaseStrategy::Shy {
                radius: SHY_RADIUS_CELLS,
            },
            spawn_marker: '3',
            scatter_marker: 'c',
            initial_direction: Direction::Left,
        },
    ]
}

impl SimulationConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, phase) in self.phases.iter().enumerate() {
            if !matches!(phase.mode, GhostMode::Scatter | GhostMode::Chase) {
                return Err(ConfigError::UnschedulableMode {
                    index,
                    mode: phase.mode,
                });
            }
            if !phase.duration.is_finite() || phase.duration < 0.0 {
                return Err(ConfigError::InvalidPhaseDuration {
                    index,
                    duration: phase.duration,
                });
            }
        }
        positive("frightenedDuration", self.frightened_duration)?;
        positive("playerSpeed", self.player_speed)?;
        positive("speed.normal", self.speed.normal)?;
        positive("speed.frightened", self.speed.frightened)?;
        positive("speed.house", self.speed.house)?;
        positive("speed.tunnel", self.speed.tunnel)?;
        for ghost in &self.ghosts {
            let (field, value) = match ghost.strategy {
                ChaseStrategy::Direct => continue,
                ChaseStrategy::Predictive { lead } | ChaseStrategy::Pincer { lead } => ("lead", lead),
                ChaseStrategy::Shy { radius } => ("radius", radius),
            };
            if !(0..=MAX_STRATEGY_CELLS).contains(&value) {
                return Err(ConfigError::StrategyOutOfRange {
                    ghost: ghost.name.clone(),
                    field,
                    value,
                    max: MAX_STRATEGY_CELLS,
                });
            }
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::InvalidNumber {
                field: "tickRate",
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn tick_sec(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidNumber { field, value })
    }
}
