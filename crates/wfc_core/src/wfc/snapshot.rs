//! Read-only grid views for presentation layers.

use super::catalog::{TileCatalog, TileId};
use super::grid::Grid;
use serde::{Deserialize, Serialize};

/// Glyph printed for cells that still have several options.
pub const PENDING_GLYPH: char = '?';
/// Glyph printed for cells with no options left.
pub const CONTRADICTION_GLYPH: char = '!';

/// What a renderer sees for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellView {
    /// Exactly one option remains.
    Resolved(TileId),
    /// Remaining options; empty for a contradiction.
    Candidates(Vec<TileId>),
}

impl CellView {
    pub fn resolved(&self) -> Option<TileId> {
        match self {
            CellView::Resolved(tile) => Some(*tile),
            CellView::Candidates(_) => None,
        }
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self, CellView::Candidates(options) if options.is_empty())
    }
}

/// Immutable copy of a grid taken between ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell views.
    pub cells: Vec<CellView>,
}

impl GridSnapshot {
    pub fn from_grid(grid: &Grid) -> Self {
        let cells = grid
            .iter()
            .map(|(_, cell)| match cell.resolved() {
                Some(tile) => CellView::Resolved(tile),
                None => CellView::Candidates(cell.options.clone()),
            })
            .collect();
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            cells,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellView> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    pub fn resolved_count(&self) -> usize {
        self.cells.iter().filter(|c| c.resolved().is_some()).count()
    }

    /// Render one line per row using each tile's glyph.
    ///
    /// Tiles without a glyph use the first letter of their name.
    pub fn to_text(&self, catalog: &TileCatalog) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1) * 3);
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 && i % self.cols == 0 {
                out.push('\n');
            }
            out.push(match cell {
                CellView::Resolved(tile) => glyph_for(catalog, *tile),
                CellView::Candidates(options) if options.is_empty() => CONTRADICTION_GLYPH,
                CellView::Candidates(_) => PENDING_GLYPH,
            });
        }
        out
    }
}

fn glyph_for(catalog: &TileCatalog, tile: TileId) -> char {
    catalog
        .get(tile)
        .and_then(|def| def.glyph.or_else(|| def.name.chars().next()))
        .unwrap_or(PENDING_GLYPH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_views() {
        let catalog = TileCatalog::knots();
        let mut grid = Grid::new(2, 2);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(0, 0, TileId(1));
        grid.narrow(1, 1, &[]);

        let snapshot = GridSnapshot::from_grid(&grid);
        assert_eq!(snapshot.get(0, 0), Some(&CellView::Resolved(TileId(1))));
        assert_eq!(
            snapshot.get(0, 1),
            Some(&CellView::Candidates(catalog.tile_ids()))
        );
        assert!(snapshot.get(1, 1).is_some_and(CellView::is_contradiction));
        assert_eq!(snapshot.get(2, 0), None);
        assert_eq!(snapshot.resolved_count(), 1);
    }

    #[test]
    fn test_to_text_uses_glyphs() {
        let catalog = TileCatalog::knots();
        let mut grid = Grid::new(2, 3);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(0, 0, TileId(0));
        grid.collapse_cell(0, 1, TileId(3));
        grid.narrow(1, 2, &[]);

        let text = GridSnapshot::from_grid(&grid).to_text(&catalog);
        assert_eq!(text, ".┬?\n??!");
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut grid = Grid::new(1, 2);
        grid.initialize(&[TileId(0), TileId(1)]);
        grid.collapse_cell(0, 0, TileId(1));

        let json = serde_json::to_value(GridSnapshot::from_grid(&grid)).unwrap();
        assert_eq!(json["rows"], 1);
        assert_eq!(json["cells"][0]["resolved"], 1);
        assert_eq!(json["cells"][1]["candidates"], serde_json::json!([0, 1]));
    }
}
