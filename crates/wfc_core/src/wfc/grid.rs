//! Grid of candidate sets.
//!
//! Each cell holds the tiles it may still become. A cell is collapsed when
//! exactly one option remains and contradictory when none remain. Cells are
//! stored row-major; `(row, col)` addressing matches the propagation sweep.

use super::catalog::TileId;
use crate::rng::{choose_with_rng, TileRng};
use serde::{Deserialize, Serialize};

/// Candidate set of a single cell.
///
/// Options keep the order they were initialized in (catalog order), so a
/// uniform pick by index is reproducible for a given seed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub options: Vec<TileId>,
}

impl Cell {
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.options.len() == 1
    }

    #[inline]
    pub fn is_contradiction(&self) -> bool {
        self.options.is_empty()
    }

    /// The resolved tile if collapsed.
    pub fn resolved(&self) -> Option<TileId> {
        match self.options.as_slice() {
            [tile] => Some(*tile),
            _ => None,
        }
    }

    /// Number of remaining options.
    #[inline]
    pub fn entropy(&self) -> usize {
        self.options.len()
    }
}

/// Rows x cols matrix of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate a grid of empty cells. Call [`Grid::initialize`] before use.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    /// Square `n x n` grid.
    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[self.index(row, col)]
    }

    pub fn options(&self, row: usize, col: usize) -> &[TileId] {
        &self.cell(row, col).options
    }

    pub fn is_collapsed(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_collapsed()
    }

    /// Cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Cell)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i / cols, i % cols), cell))
    }

    /// Give every cell the full set of tile ids.
    pub fn initialize(&mut self, all_tile_ids: &[TileId]) {
        for cell in &mut self.cells {
            cell.options.clear();
            cell.options.extend_from_slice(all_tile_ids);
        }
    }

    /// Collapse one uniformly chosen cell to a uniformly chosen option.
    ///
    /// Row and column are drawn independently. Returns the placement, or
    /// `None` when the grid has no cells or the chosen cell has no options.
    pub fn seed_collapse(&mut self, rng: &mut dyn TileRng) -> Option<(usize, usize, TileId)> {
        if self.is_empty() {
            return None;
        }
        let row = rng.next_usize_max(self.rows);
        let col = rng.next_usize_max(self.cols);
        let tile = *choose_with_rng(self.options(row, col), rng)?;
        self.collapse_cell(row, col, tile);
        Some((row, col, tile))
    }

    /// Force a cell to a single value.
    pub fn collapse_cell(&mut self, row: usize, col: usize, tile: TileId) {
        let i = self.index(row, col);
        let options = &mut self.cells[i].options;
        options.clear();
        options.push(tile);
    }

    /// Intersect a cell's options with `allowed`.
    ///
    /// Never adds options; order of the survivors is kept.
    pub fn narrow(&mut self, row: usize, col: usize, allowed: &[TileId]) {
        let i = self.index(row, col);
        self.cells[i].options.retain(|tile| allowed.contains(tile));
    }

    /// Number of cells with exactly one option.
    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_collapsed()).count()
    }

    /// Coordinates of every cell with no options left.
    pub fn contradictions(&self) -> Vec<(usize, usize)> {
        self.iter()
            .filter(|(_, cell)| cell.is_contradiction())
            .map(|(pos, _)| pos)
            .collect()
    }
}
