use crate::constants::CENTER_EPSILON;
use crate::grid::Grid;
use crate::types::{AgentKind, Cell, Direction, PlayerView, WorldPos};

/// Input-driven player. The requested direction is buffered and applied the
/// next time the player sits on a tile center with that exit open.
#[derive(Clone, Debug)]
pub struct PlayerMotor {
    pub position: WorldPos,
    pub direction: Direction,
    pub desired: Direction,
    pub target_cell: Cell,
    pub speed: f32,
}

impl PlayerMotor {
    pub fn spawn(grid: &Grid, cell: Cell, speed: f32) -> Self {
        Self {
            position: grid.world_center_of(cell),
            direction: Direction::Right,
            desired: Direction::Right,
            target_cell: cell,
            speed,
        }
    }

    pub fn set_desired(&mut self, dir: Direction) {
        if !dir.is_none() {
            self.desired = dir;
        }
    }

    pub fn current_cell(&self, grid: &Grid) -> Cell {
        grid.cell_of(self.position)
    }

    pub fn step(&mut self, grid: &Grid, dt: f32) {
        let center = grid.world_center_of(self.target_cell);
        if self.position.distance(center) < CENTER_EPSILON {
            self.position = center;
            let here = self.target_cell;
            if grid.can_step(here, self.desired, AgentKind::Player) {
                self.direction = self.desired;
            }
            if !grid.can_step(here, self.direction, AgentKind::Player) {
                self.direction = Direction::None;
            }
            if !self.direction.is_none() {
                self.target_cell = here.step(self.direction);
            }
        }

        let target = grid.world_center_of(self.target_cell);
        self.position = self.position.move_towards(target, self.speed * dt);
    }

    pub fn view(&self, grid: &Grid) -> PlayerView {
        PlayerView {
            cell: self.current_cell(grid),
            dir: self.direction,
            speed: self.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hallway() -> Grid {
        Grid::parse(&["#######", "#.....#", "#.###.#", "#.....#", "#######"]).expect("valid maze")
    }

    fn run(motor: &mut PlayerMotor, grid: &Grid, ticks: usize) {
        for _ in 0..ticks {
            motor.step(grid, 0.1);
        }
    }

    #[test]
    fn starts_heading_right_and_stops_at_wall() {
        let grid = hallway();
        let mut motor = PlayerMotor::spawn(&grid, Cell::new(1, 1), 5.0);
        run(&mut motor, &grid, 20);
        assert_eq!(motor.current_cell(&grid), Cell::new(5, 1));
        assert_eq!(motor.direction, Direction::None);
        assert_eq!(motor.view(&grid).dir, Direction::None);
    }

    #[test]
    fn buffered_turn_is_taken_at_the_next_open_junction() {
        let grid = hallway();
        let mut motor = PlayerMotor::spawn(&grid, Cell::new(2, 1), 5.0);
        motor.step(&grid, 0.1);
        motor.set_desired(Direction::Down);
        run(&mut motor, &grid, 7);
        assert_eq!(motor.current_cell(&grid).x, 5);
        assert!(motor.current_cell(&grid).y >= 2);
        assert_eq!(motor.direction, Direction::Down);
    }

    #[test]
    fn turns_wait_for_the_tile_center() {
        let grid = hallway();
        let mut motor = PlayerMotor::spawn(&grid, Cell::new(2, 1), 5.0);
        motor.step(&grid, 0.1);
        assert_eq!(motor.target_cell, Cell::new(3, 1));

        motor.set_desired(Direction::Left);
        motor.step(&grid, 0.02);
        assert_eq!(motor.direction, Direction::Right);
        assert_eq!(motor.target_cell, Cell::new(3, 1));

        motor.step(&grid, 0.08);
        motor.step(&grid, 0.02);
        assert_eq!(motor.direction, Direction::Left);
        assert_eq!(motor.target_cell, Cell::new(2, 1));
    }

    #[test]
    fn none_input_keeps_previous_request() {
        let grid = hallway();
        let mut motor = PlayerMotor::spawn(&grid, Cell::new(1, 1), 5.0);
        motor.set_desired(Direction::Down);
        motor.set_desired(Direction::None);
        assert_eq!(motor.desired, Direction::Down);
    }
}
