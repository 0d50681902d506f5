//! Configuration and level-loading errors.
//!
//! Nothing that happens while the simulation is stepping is an error; these
//! only come out of parsing mazes and configuration, or are recorded as
//! non-fatal issues when a level lacks a marker the roster asks for.

use crate::types::GhostMode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("maze has no rows")]
    EmptyMaze,

    #[error("maze row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: i32, y: i32 },

    #[error("no cell carries marker {marker:?} ({purpose})")]
    MissingMarker {
        marker: char,
        purpose: &'static str,
    },

    #[error("phase {index} uses mode {mode:?}; only scatter and chase can be scheduled")]
    UnschedulableMode { index: usize, mode: GhostMode },

    #[error("phase {index} has invalid duration {duration}")]
    InvalidPhaseDuration { index: usize, duration: f32 },

    #[error("ghost {ghost} strategy {field} is {value}, expected 0..={max}")]
    StrategyOutOfRange {
        ghost: String,
        field: &'static str,
        value: i32,
        max: i32,
    },

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidNumber { field: &'static str, value: f32 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
}
