//! Cardinal directions between neighbouring cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four cardinal neighbours of a cell.
///
/// Declaration order is the order propagation visits neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in propagation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Index into per-direction arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// The direction pointing back at the origin cell.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// `(row, col)` offset of the neighbour. Rows grow downwards.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// Neighbour of `(row, col)` inside a `rows x cols` grid, if any.
    pub fn step(self, row: usize, col: usize, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let (dr, dc) = self.offset();
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < rows && c < cols).then_some((r, c))
    }

    /// Lowercase name used by tileset files.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }

    /// Parse a tileset attribute name. Accepts `top`/`bottom` as aliases.
    pub fn from_name(name: &str) -> Option<Direction> {
        match name {
            "up" | "top" => Some(Direction::Up),
            "right" => Some(Direction::Right),
            "down" | "bottom" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
