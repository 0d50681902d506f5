//! Static maze layers and the collision / coordinate queries built on them.

use crate::constants::CELL_SIZE;
use crate::error::ConfigError;
use crate::types::{AgentKind, Cell, Direction, WorldPos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
    Tunnel,
    Room,
    Door,
}

#[derive(Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub cell_size: f32,
    tiles: Vec<Vec<Tile>>,
    markers: Vec<(Cell, char)>,
    power_pellets: Vec<Cell>,
    player_spawn: Option<Cell>,
}

impl Grid {
    /// Glyphs: `#` wall, `-` ghost door, `h` ghost room, `t` tunnel,
    /// `.`/space floor, `o` power pellet, `P` player spawn. Other lowercase
    /// letters mark scatter corners, other uppercase letters mark ghost spawns
    /// on the floor and digits mark ghost spawns inside the room.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigError> {
        let Some(first) = rows.first() else {
            return Err(ConfigError::EmptyMaze);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(ConfigError::EmptyMaze);
        }

        let mut tiles = Vec::with_capacity(rows.len());
        let mut markers = Vec::new();
        let mut power_pellets = Vec::new();
        let mut player_spawn = None;

        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedRow {
                    row: row_idx,
                    expected: width,
                    found,
                });
            }
            let y = row_idx as i32;
            let mut line = Vec::with_capacity(width);
            for (col_idx, glyph) in row.chars().enumerate() {
                let cell = Cell::new(col_idx as i32, y);
                let tile = match glyph {
                    '#' => Tile::Wall,
                    '-' => Tile::Door,
                    'h' => Tile::Room,
                    't' => Tile::Tunnel,
                    '.' | ' ' => Tile::Floor,
                    'o' => {
                        power_pellets.push(cell);
                        Tile::Floor
                    }
                    'P' => {
                        player_spawn.get_or_insert(cell);
                        Tile::Floor
                    }
                    c if c.is_ascii_digit() => {
                        markers.push((cell, c));
                        Tile::Room
                    }
                    c if c.is_ascii_alphabetic() => {
                        markers.push((cell, c));
                        Tile::Floor
                    }
                    _ => {
                        return Err(ConfigError::UnknownGlyph {
                            glyph,
                            x: cell.x,
                            y: cell.y,
                        })
                    }
                };
                line.push(tile);
            }
            tiles.push(line);
        }

        Ok(Self {
            width: width as i32,
            height: tiles.len() as i32,
            cell_size: CELL_SIZE,
            tiles,
            markers,
            power_pellets,
            player_spawn,
        })
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return Tile::Wall;
        }
        self.tiles[cell.y as usize][cell.x as usize]
    }

    pub fn is_blocked(&self, cell: Cell, kind: AgentKind) -> bool {
        match self.tile(cell) {
            Tile::Wall => true,
            Tile::Room | Tile::Door => kind != AgentKind::HousedGhost,
            Tile::Floor | Tile::Tunnel => false,
        }
    }

    pub fn can_step(&self, from: Cell, dir: Direction, kind: AgentKind) -> bool {
        !dir.is_none() && !self.is_blocked(from.step(dir), kind)
    }

    pub fn is_house(&self, cell: Cell) -> bool {
        matches!(self.tile(cell), Tile::Room | Tile::Door)
    }

    pub fn is_tunnel(&self, cell: Cell) -> bool {
        self.tile(cell) == Tile::Tunnel
    }

    /// Collision class of a ghost standing on `cell`.
    pub fn ghost_kind_at(&self, cell: Cell) -> AgentKind {
        if self.is_house(cell) {
            AgentKind::HousedGhost
        } else {
            AgentKind::Ghost
        }
    }

    /// First open cell adjacent to a door, scanning doors row-major.
    pub fn house_exit(&self) -> Option<Cell> {
        for y in 0..self.height {
            for x in 0..self.width {
                let door = Cell::new(x, y);
                if self.tile(door) != Tile::Door {
                    continue;
                }
                for dir in Direction::PRIORITY {
                    let next = door.step(dir);
                    if matches!(self.tile(next), Tile::Floor | Tile::Tunnel) {
                        return Some(next);
                    }
                }
            }
        }
        None
    }

    /// Row-major scan for the first cell carrying `marker`.
    pub fn find_marker(&self, marker: char) -> Option<Cell> {
        self.markers
            .iter()
            .find(|(_, glyph)| *glyph == marker)
            .map(|(cell, _)| *cell)
    }

    pub fn power_pellets(&self) -> &[Cell] {
        &self.power_pellets
    }

    pub fn player_spawn(&self) -> Option<Cell> {
        self.player_spawn
    }

    pub fn cell_of(&self, pos: WorldPos) -> Cell {
        Cell::new(
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn world_center_of(&self, cell: Cell) -> WorldPos {
        WorldPos::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Grid {
        Grid::parse(&[
            "#########",
            "#a..o..b#",
            "#.##-##.#",
            "#.#1h2#.#",
            "#t..P..t#",
            "#########",
        ])
        .expect("valid maze")
    }

    #[test]
    fn walls_block_everyone_and_out_of_bounds_is_wall() {
        let grid = small();
        assert!(grid.is_blocked(Cell::new(0, 0), AgentKind::Player));
        assert!(grid.is_blocked(Cell::new(0, 0), AgentKind::HousedGhost));
        assert!(grid.is_blocked(Cell::new(-1, 2), AgentKind::Ghost));
        assert!(grid.is_blocked(Cell::new(3, 99), AgentKind::Ghost));
    }

    #[test]
    fn house_cells_admit_only_housed_ghosts() {
        let grid = small();
        let door = Cell::new(4, 2);
        let room = Cell::new(4, 3);
        assert!(grid.is_blocked(door, AgentKind::Player));
        assert!(grid.is_blocked(door, AgentKind::Ghost));
        assert!(!grid.is_blocked(door, AgentKind::HousedGhost));
        assert!(!grid.is_blocked(room, AgentKind::HousedGhost));
        assert_eq!(grid.ghost_kind_at(Cell::new(3, 3)), AgentKind::HousedGhost);
        assert_eq!(grid.ghost_kind_at(Cell::new(1, 1)), AgentKind::Ghost);
    }

    #[test]
    fn markers_spawns_and_pellets_are_collected() {
        let grid = small();
        assert_eq!(grid.find_marker('a'), Some(Cell::new(1, 1)));
        assert_eq!(grid.find_marker('b'), Some(Cell::new(7, 1)));
        assert_eq!(grid.find_marker('2'), Some(Cell::new(5, 3)));
        assert_eq!(grid.find_marker('z'), None);
        assert_eq!(grid.player_spawn(), Some(Cell::new(4, 4)));
        assert_eq!(grid.power_pellets(), &[Cell::new(4, 1)]);
        assert!(grid.is_tunnel(Cell::new(1, 4)));
        assert_eq!(grid.house_exit(), Some(Cell::new(4, 1)));
    }

    #[test]
    fn world_center_round_trips_through_cell_of() {
        let grid = small();
        let cell = Cell::new(3, 4);
        let center = grid.world_center_of(cell);
        assert_eq!(center, WorldPos::new(3.5, 4.5));
        assert_eq!(grid.cell_of(center), cell);
        assert_eq!(grid.cell_of(WorldPos::new(3.99, 4.01)), cell);
    }

    #[test]
    fn ragged_and_unknown_rows_are_rejected() {
        assert!(matches!(
            Grid::parse(&["###", "##"]),
            Err(ConfigError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            Grid::parse(&["#?#"]),
            Err(ConfigError::UnknownGlyph { glyph: '?', .. })
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(Grid::parse(&empty), Err(ConfigError::EmptyMaze)));
    }
}
