//! Error types surfaced to the host
//!
//! Ticking the simulation never fails; only loading data can.

use thiserror::Error;

/// A level definition that cannot produce a playable level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level catalog is empty")]
    EmptyCatalog,

    #[error("level index {index} out of range (catalog has {len} levels)")]
    NoSuchLevel { index: usize, len: usize },

    #[error("level '{name}': grid is {actual_rows} rows, expected {height}")]
    RowCount {
        name: String,
        height: u32,
        actual_rows: usize,
    },

    #[error("level '{name}': row {row} is {actual} tiles wide, expected {width}")]
    RowWidth {
        name: String,
        row: usize,
        width: u32,
        actual: usize,
    },

    #[error("level '{name}': unknown tile code {code} at ({row}, {col})")]
    UnknownTile {
        name: String,
        code: u8,
        row: usize,
        col: usize,
    },

    #[error("level '{name}': spawn tile ({tx}, {ty}) lies outside the grid")]
    SpawnOutOfBounds { name: String, tx: u32, ty: u32 },

    #[error("level '{name}': {species} spawn tile ({tx}, {ty}) lies outside the grid")]
    EnemyOutOfBounds {
        name: String,
        species: String,
        tx: u32,
        ty: u32,
    },

    #[error("level '{name}': collectible tile ({tx}, {ty}) lies outside the grid")]
    CollectibleOutOfBounds { name: String, tx: u32, ty: u32 },

    #[error("level '{name}': lava vent at column {col} spanning {span} runs past the grid")]
    VentOutOfBounds { name: String, col: u32, span: u32 },

    #[error("level '{name}' has no goal column and is not a boss level")]
    MissingGoal { name: String },

    #[error("level '{name}': goal column {goal_x} lies outside the grid")]
    GoalOutOfBounds { name: String, goal_x: u32 },

    #[error("boss level '{name}' has no boss in its enemy list")]
    MissingBoss { name: String },
}

/// Settings or catalog text that failed to parse
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Level(#[from] LevelError),
}
