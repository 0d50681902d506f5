use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir, 1)
    }

    pub fn offset(self, dir: Direction, cells: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x.saturating_add(dx.saturating_mul(cells)),
            y: self.y.saturating_add(dy.saturating_mul(cells)),
        }
    }

    pub fn distance_sq(self, other: Cell) -> i32 {
        let dx = self.x.saturating_sub(other.x);
        let dy = self.y.saturating_sub(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

/// Grid heading. Rows grow downward, so `Up` decrements `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Tie-break order for every distance comparison.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn reverse(self) -> Option<Self> {
        match self {
            Self::Up => Some(Self::Down),
            Self::Down => Some(Self::Up),
            Self::Left => Some(Self::Right),
            Self::Right => Some(Self::Left),
            Self::None => None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Returning,
}

impl GhostMode {
    pub fn is_scatter_chase_flip(from: GhostMode, to: GhostMode) -> bool {
        matches!(
            (from, to),
            (GhostMode::Scatter, GhostMode::Chase) | (GhostMode::Chase, GhostMode::Scatter)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModeChange {
    pub from: GhostMode,
    pub to: GhostMode,
}

impl ModeChange {
    pub fn is_scatter_chase_flip(&self) -> bool {
        GhostMode::is_scatter_chase_flip(self.from, self.to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Player,
    Ghost,
    HousedGhost,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: WorldPos) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn move_towards(self, target: WorldPos, max_delta: f32) -> WorldPos {
        let dist = self.distance(target);
        if dist <= max_delta || dist == 0.0 {
            return target;
        }
        let t = max_delta / dist;
        WorldPos {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub cell: Cell,
    pub dir: Direction,
    pub speed: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerSnapshot {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "worldX")]
    pub world_x: f32,
    #[serde(rename = "worldY")]
    pub world_y: f32,
    pub dir: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostSnapshot {
    pub name: String,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "worldX")]
    pub world_x: f32,
    #[serde(rename = "worldY")]
    pub world_y: f32,
    pub dir: Direction,
    #[serde(rename = "targetX")]
    pub target_x: i32,
    #[serde(rename = "targetY")]
    pub target_y: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    ModeChanged { from: GhostMode, to: GhostMode },
    PelletTaken { x: i32, y: i32 },
    GhostReversed { ghost: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedSec")]
    pub elapsed_sec: f32,
    pub mode: GhostMode,
    pub frightened: bool,
    #[serde(rename = "pelletsLeft")]
    pub pellets_left: usize,
    pub player: PlayerSnapshot,
    pub ghosts: Vec<GhostSnapshot>,
    pub events: Vec<RuntimeEvent>,
}
