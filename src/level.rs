use std::path::Path;

use crate::error::ConfigError;
use crate::grid::Grid;

pub const CLASSIC_MAZE: &[&str] = &[
    "###################",
    "#a.......#.......b#",
    "#.##.###.#.###.##.#",
    "#o##.###.#.###.##o#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###.#.###.####",
    "####.#...B.....####",
    "####.#.##-##.#.####",
    "#ttt...#123#...ttt#",
    "####.#.#####.#.####",
    "####.#.......#.####",
    "####.#.#####.#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#.....P.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#c...............d#",
    "###################",
];

pub fn classic_grid() -> Result<Grid, ConfigError> {
    Grid::parse(CLASSIC_MAZE)
}

pub fn load_maze(path: &Path) -> Result<Grid, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .collect();
    Grid::parse(&rows)
}
