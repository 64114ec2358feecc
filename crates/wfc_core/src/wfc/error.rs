//! Error types for catalog construction and solver runs.

use super::catalog::TileId;
use super::direction::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Invalid catalog or run configuration. Raised before any tick executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Catalog defines no tiles.
    EmptyCatalog,
    /// The same tile id is defined twice.
    DuplicateTile(TileId),
    /// A rule set references a tile the catalog does not define.
    UndefinedTile {
        tile: TileId,
        direction: Direction,
        referenced: TileId,
    },
    /// Grid must have at least one cell and a cell count that fits in `usize`.
    InvalidDimension { rows: usize, cols: usize },
    /// Fixed seed placement lies outside the grid or names an unknown tile.
    InvalidSeedCell { row: usize, col: usize, tile: TileId },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyCatalog => write!(f, "catalog defines no tiles"),
            ConfigError::DuplicateTile(id) => write!(f, "tile {} is defined more than once", id),
            ConfigError::UndefinedTile {
                tile,
                direction,
                referenced,
            } => write!(
                f,
                "tile {} allows undefined tile {} to its {}",
                tile, referenced, direction
            ),
            ConfigError::InvalidDimension { rows, cols } => {
                write!(f, "grid {}x{} is empty or too large", rows, cols)
            }
            ConfigError::InvalidSeedCell { row, col, tile } => write!(
                f,
                "seed cell ({}, {}) with tile {} is outside the grid or catalog",
                row, col, tile
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// How a cell became contradictory during propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    /// A non-empty candidate set was narrowed to nothing.
    Emptied,
    /// A collapsed cell lost its resolved value.
    Invalidated { previous: TileId },
}

/// Contradiction surfaced by a strict-mode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContradictionError {
    pub row: usize,
    pub col: usize,
    pub tick: u64,
    pub kind: ContradictionKind,
}

impl fmt::Display for ContradictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ContradictionKind::Emptied => write!(
                f,
                "cell ({}, {}) ran out of options on tick {}",
                self.row, self.col, self.tick
            ),
            ContradictionKind::Invalidated { previous } => write!(
                f,
                "cell ({}, {}) lost resolved tile {} on tick {}",
                self.row, self.col, previous, self.tick
            ),
        }
    }
}

impl std::error::Error for ContradictionError {}
