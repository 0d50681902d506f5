use super::*;

/// Places every roster entry on its spawn marker. A missing spawn is fatal; a
/// missing scatter corner is recorded in `issues` and the ghost scatters
/// toward the origin instead.
pub(super) fn spawn_roster(
    grid: &Grid,
    roster: &[GhostConfig],
    issues: &mut Vec<ConfigError>,
) -> Result<Vec<Ghost>, ConfigError> {
    let mut ghosts = Vec::with_capacity(roster.len());
    for entry in roster {
        let home = grid
            .find_marker(entry.spawn_marker)
            .ok_or(ConfigError::MissingMarker {
                marker: entry.spawn_marker,
                purpose: "ghost spawn",
            })?;
        let scatter_corner = match resolve_scatter_corner(grid, entry.scatter_marker) {
            Ok(cell) => cell,
            Err(err) => {
                tracing::warn!(ghost = %entry.name, error = %err, "scatter corner falls back to origin");
                issues.push(err);
                Cell::ORIGIN
            }
        };
        ghosts.push(Ghost {
            name: entry.name.clone(),
            brain: GhostBrain::new(entry.strategy, scatter_corner),
            motor: GhostMotor::spawn(grid, grid.world_center_of(home), entry.initial_direction),
            home,
        });
    }
    Ok(ghosts)
}

impl GameEngine {
    /// Puts a ghost back on its spawn cell with its configured heading.
    pub fn respawn_ghost(&mut self, ghost_idx: usize) {
        let Some(ghost) = self.ghosts.get_mut(ghost_idx) else {
            return;
        };
        let heading = self
            .config
            .ghosts
            .get(ghost_idx)
            .map(|entry| entry.initial_direction)
            .unwrap_or_default();
        ghost.motor = GhostMotor::spawn(&self.grid, self.grid.world_center_of(ghost.home), heading);
        tracing::debug!(ghost = %ghost.name, x = ghost.home.x, y = ghost.home.y, "ghost respawned");
    }
}
