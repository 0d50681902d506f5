use crate::config::{GhostConfig, SimulationConfig};
use crate::constants::MAX_PENDING_EVENTS;
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::mode_controller::{ModeController, ModeListener, PhaseSchedule};
use crate::rng::Rng;
use crate::targeting::{resolve_scatter_corner, GhostBrain, TargetContext};
use crate::types::{
    Cell, Direction, GhostSnapshot, ModeChange, PlayerSnapshot, RuntimeEvent, Snapshot,
};

mod ghost_motor;
mod pellet_system;
mod player_motor;
mod spawn_system;
mod utils;

pub use self::ghost_motor::{Ghost, GhostMotor};
pub use self::pellet_system::PelletSystem;
pub use self::player_motor::PlayerMotor;

use self::ghost_motor::GhostStepParams;

struct GhostFanout<'a> {
    grid: &'a Grid,
    ghosts: &'a mut [Ghost],
    events: &'a mut Vec<RuntimeEvent>,
}

impl ModeListener for GhostFanout<'_> {
    fn on_mode_changed(&mut self, change: ModeChange) {
        self.events.push(RuntimeEvent::ModeChanged {
            from: change.from,
            to: change.to,
        });
        for ghost in self.ghosts.iter_mut() {
            if ghost.motor.on_mode_changed(self.grid, change) {
                self.events.push(RuntimeEvent::GhostReversed {
                    ghost: ghost.name.clone(),
                });
            }
        }
    }
}

pub struct GameEngine {
    pub grid: Grid,
    pub config: SimulationConfig,

    rng: Rng,
    modes: ModeController,
    player: PlayerMotor,
    ghosts: Vec<Ghost>,
    pellets: PelletSystem,
    events: Vec<RuntimeEvent>,
    issues: Vec<ConfigError>,

    tick_counter: u64,
    elapsed_sec: f32,
}

impl GameEngine {
    pub fn new(grid: Grid, config: SimulationConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let player_cell = grid.player_spawn().ok_or(ConfigError::MissingMarker {
            marker: 'P',
            purpose: "player spawn",
        })?;

        let mut issues = Vec::new();
        let ghosts = spawn_system::spawn_roster(&grid, &config.ghosts, &mut issues)?;
        let player = PlayerMotor::spawn(&grid, player_cell, config.player_speed);
        let pellets = PelletSystem::from_grid(&grid);
        let modes = ModeController::new(PhaseSchedule::from_config(&config.phases));

        tracing::debug!(
            seed,
            ghosts = ghosts.len(),
            pellets = pellets.remaining(),
            mode = ?modes.current_mode(),
            "engine ready"
        );

        Ok(Self {
            grid,
            config,
            rng: Rng::new(seed),
            modes,
            player,
            ghosts,
            pellets,
            events: Vec::new(),
            issues,
            tick_counter: 0,
            elapsed_sec: 0.0,
        })
    }

    pub fn step(&mut self, dt: f32) {
        self.tick_counter += 1;
        self.elapsed_sec += dt;

        self.modes.tick(
            dt,
            &mut GhostFanout {
                grid: &self.grid,
                ghosts: &mut self.ghosts,
                events: &mut self.events,
            },
        );
        self.player.step(&self.grid, dt);
        self.update_pellets();
        self.update_ghosts(dt);
        self.cap_pending_events();
    }

    fn cap_pending_events(&mut self) {
        let overflow = self.events.len().saturating_sub(MAX_PENDING_EVENTS);
        if overflow > 0 {
            self.events.drain(..overflow);
            tracing::warn!(dropped = overflow, "runtime event queue full, oldest events dropped");
        }
    }

    fn update_pellets(&mut self) {
        let cell = self.player.current_cell(&self.grid);
        if !self.pellets.take_at(cell) {
            return;
        }
        self.events.push(RuntimeEvent::PelletTaken {
            x: cell.x,
            y: cell.y,
        });
        tracing::debug!(
            x = cell.x,
            y = cell.y,
            left = self.pellets.remaining(),
            "power pellet taken"
        );
        self.trigger_frightened();
    }

    fn update_ghosts(&mut self, dt: f32) {
        let params = GhostStepParams {
            mode: self.modes.current_mode(),
            base_speed: self.config.player_speed,
            profile: &self.config.speed,
            dt,
        };
        let player = self.player.view(&self.grid);
        let mut partner: Option<Cell> = None;
        for ghost in self.ghosts.iter_mut() {
            let ctx = TargetContext {
                grid: &self.grid,
                player,
                partner,
            };
            ghost.step(&ctx, params, &mut self.rng);
            if partner.is_none() {
                partner = Some(ghost.motor.current_cell(&self.grid));
            }
        }
    }

    pub fn trigger_frightened(&mut self) {
        self.modes.trigger_frightened(
            self.config.frightened_duration,
            &mut GhostFanout {
                grid: &self.grid,
                ghosts: &mut self.ghosts,
                events: &mut self.events,
            },
        );
        self.cap_pending_events();
    }

    pub fn set_player_input(&mut self, dir: Direction) {
        self.player.set_desired(dir);
    }

    /// Events accumulate across snapshots built with `include_events == false`
    /// and are drained by the next one that includes them.
    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let player_cell = self.player.current_cell(&self.grid);
        Snapshot {
            tick: self.tick_counter,
            elapsed_sec: self.elapsed_sec,
            mode: self.modes.current_mode(),
            frightened: self.modes.is_frightened(),
            pellets_left: self.pellets.remaining(),
            player: PlayerSnapshot {
                x: player_cell.x,
                y: player_cell.y,
                world_x: self.player.position.x,
                world_y: self.player.position.y,
                dir: self.player.direction,
            },
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| {
                    let cell = ghost.motor.current_cell(&self.grid);
                    GhostSnapshot {
                        name: ghost.name.clone(),
                        x: cell.x,
                        y: cell.y,
                        world_x: ghost.motor.position.x,
                        world_y: ghost.motor.position.y,
                        dir: ghost.motor.direction,
                        target_x: ghost.motor.target_cell.x,
                        target_y: ghost.motor.target_cell.y,
                    }
                })
                .collect(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeController {
        &mut self.modes
    }

    pub fn player(&self) -> &PlayerMotor {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn pellets(&self) -> &PelletSystem {
        &self.pellets
    }

    pub fn issues(&self) -> &[ConfigError] {
        &self.issues
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn elapsed_sec(&self) -> f32 {
        self.elapsed_sec
    }
}
