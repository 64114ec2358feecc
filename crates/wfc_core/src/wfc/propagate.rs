//! Constraint propagation from collapsed cells to their neighbours.
//!
//! This is a batched sweep, not a per-edge worklist: every collapsed cell
//! narrows its four neighbours, the whole grid is swept again, and the loop
//! stops once a sweep produces no additional collapsed cell. Convergence is
//! judged by the collapsed *count* only. A sweep that shrinks a cell from
//! three options to two, without collapsing anything, ends the loop.
//!
//! Collapsed cells are narrowed like any other cell. A neighbour can empty
//! them or replace their value; propagation keeps going regardless. Callers
//! that want to see those events pass a [`PropagationObserver`].

use super::catalog::{TileCatalog, TileId};
use super::direction::Direction;
use super::error::ContradictionKind;
use super::grid::Grid;

/// Receives contradictions as propagation creates them.
pub trait PropagationObserver {
    fn on_contradiction(&mut self, row: usize, col: usize, kind: ContradictionKind);
}

/// Observer that ignores everything.
pub struct SilentObserver;

impl PropagationObserver for SilentObserver {
    fn on_contradiction(&mut self, _row: usize, _col: usize, _kind: ContradictionKind) {}
}

/// Observer that keeps every contradiction in order of discovery.
#[derive(Debug, Default)]
pub struct ContradictionLog {
    pub entries: Vec<(usize, usize, ContradictionKind)>,
}

impl PropagationObserver for ContradictionLog {
    fn on_contradiction(&mut self, row: usize, col: usize, kind: ContradictionKind) {
        self.entries.push((row, col, kind));
    }
}

/// Narrow every collapsed cell's neighbours until the collapsed count settles.
pub fn propagate(grid: &mut Grid, catalog: &TileCatalog) {
    propagate_observed(grid, catalog, &mut SilentObserver);
}

/// [`propagate`] that reports contradictions to `observer`.
///
/// The grid ends up in exactly the same state as with [`propagate`].
/// Returns the number of sweeps performed.
pub fn propagate_observed(
    grid: &mut Grid,
    catalog: &TileCatalog,
    observer: &mut dyn PropagationObserver,
) -> usize {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut sweeps = 0;

    loop {
        let previous = grid.collapsed_count();
        sweeps += 1;

        for row in 0..rows {
            for col in 0..cols {
                // Read at visit time: earlier narrows in this sweep count.
                let Some(state) = grid.cell(row, col).resolved() else {
                    continue;
                };
                for dir in Direction::ALL {
                    if let Some((r, c)) = dir.step(row, col, rows, cols) {
                        let allowed = catalog.neighbors_allowed(state, dir);
                        narrow_observed(grid, r, c, allowed, observer);
                    }
                }
            }
        }

        if grid.collapsed_count() == previous {
            return sweeps;
        }
    }
}

fn narrow_observed(
    grid: &mut Grid,
    row: usize,
    col: usize,
    allowed: &[TileId],
    observer: &mut dyn PropagationObserver,
) {
    let before = grid.cell(row, col);
    let was_empty = before.is_contradiction();
    let previous = before.resolved();

    grid.narrow(row, col, allowed);

    let after = grid.cell(row, col);
    if let Some(previous) = previous {
        if after.resolved() != Some(previous) {
            observer.on_contradiction(row, col, ContradictionKind::Invalidated { previous });
        }
    } else if !was_empty && after.is_contradiction() {
        observer.on_contradiction(row, col, ContradictionKind::Emptied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wfc::catalog::TileDef;

    fn ids(raw: &[u32]) -> Vec<TileId> {
        raw.iter().copied().map(TileId).collect()
    }

    /// A: only B to the right. B: only A to the left. Everything else open.
    fn pair_catalog() -> TileCatalog {
        let all = [0u32, 1];
        TileCatalog::new(vec![
            TileDef::new(0, "A")
                .with_rule(Direction::Up, all)
                .with_rule(Direction::Right, [1u32])
                .with_rule(Direction::Down, all)
                .with_rule(Direction::Left, all),
            TileDef::new(1, "B")
                .with_rule(Direction::Up, all)
                .with_rule(Direction::Right, all)
                .with_rule(Direction::Down, all)
                .with_rule(Direction::Left, [0u32]),
        ])
        .unwrap()
    }

    #[test]
    fn test_propagate_collapses_forced_neighbour() {
        let catalog = pair_catalog();
        let mut grid = Grid::new(1, 2);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(0, 0, TileId(0));

        propagate(&mut grid, &catalog);

        assert_eq!(grid.options(0, 1), ids(&[1]).as_slice());
        assert_eq!(grid.collapsed_count(), 2);
    }

    #[test]
    fn test_propagate_chains_along_a_row() {
        // Chain tiles: tile k allows only k+1 to its right.
        let n = 5u32;
        let tiles = (0..n)
            .map(|k| {
                let def = TileDef::new(k, format!("t{}", k))
                    .with_rule(Direction::Left, 0..n)
                    .with_rule(Direction::Up, 0..n)
                    .with_rule(Direction::Down, 0..n);
                if k + 1 < n {
                    def.with_rule(Direction::Right, [k + 1])
                } else {
                    def.with_rule(Direction::Right, 0..n)
                }
            })
            .collect();
        let catalog = TileCatalog::new(tiles).unwrap();
        let mut grid = Grid::new(1, 5);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(0, 0, TileId(0));

        propagate(&mut grid, &catalog);

        for col in 0..5 {
            assert_eq!(grid.options(0, col), &[TileId(col as u32)]);
        }
    }

    #[test]
    fn test_propagate_without_collapsed_cells_is_noop() {
        let catalog = TileCatalog::knots();
        let mut grid = Grid::square(3);
        grid.initialize(&catalog.tile_ids());
        let before = grid.clone();

        let sweeps = propagate_observed(&mut grid, &catalog, &mut SilentObserver);

        assert_eq!(sweeps, 1);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_propagate_is_idempotent_at_fixpoint() {
        let catalog = TileCatalog::knots();
        let mut grid = Grid::square(6);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(2, 3, TileId(1));
        grid.collapse_cell(4, 1, TileId(0));

        propagate(&mut grid, &catalog);
        let converged = grid.clone();
        propagate(&mut grid, &catalog);

        assert_eq!(grid, converged);
    }

    #[test]
    fn test_weak_fixpoint_stops_on_count() {
        // A sweep that only shrinks a 3-option cell to 2 options ends the loop.
        let tiles = vec![
            TileDef::new(0, "a").with_rule(Direction::Down, [0u32, 1]),
            TileDef::new(1, "b"),
            TileDef::new(2, "c"),
        ];
        let catalog = TileCatalog::new(tiles).unwrap();
        let mut grid = Grid::new(2, 1);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(0, 0, TileId(0));

        let sweeps = propagate_observed(&mut grid, &catalog, &mut SilentObserver);

        assert_eq!(sweeps, 1);
        assert_eq!(grid.options(1, 0), ids(&[0, 1]).as_slice());
    }

    #[test]
    fn test_collapsed_cell_can_be_overwritten_by_neighbour() {
        // Adversarial rules: A forbids everything to its right, so a collapsed
        // B sitting there loses its only option. Nothing protects it.
        let tiles = vec![
            TileDef::new(0, "A"),
            TileDef::new(1, "B").with_rule(Direction::Left, [0u32]),
        ];
        let catalog = TileCatalog::new(tiles).unwrap();
        let mut grid = Grid::new(1, 2);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(0, 0, TileId(0));
        grid.collapse_cell(0, 1, TileId(1));

        let mut log = ContradictionLog::default();
        propagate_observed(&mut grid, &catalog, &mut log);

        assert!(grid.options(0, 1).is_empty());
        assert_eq!(
            log.entries.first(),
            Some(&(
                0,
                1,
                ContradictionKind::Invalidated {
                    previous: TileId(1)
                }
            ))
        );
    }

    #[test]
    fn test_observed_and_silent_agree() {
        let catalog = TileCatalog::knots();
        let mut a = Grid::square(5);
        a.initialize(&catalog.tile_ids());
        a.collapse_cell(0, 0, TileId(2));
        a.collapse_cell(0, 2, TileId(4));
        let mut b = a.clone();

        propagate(&mut a, &catalog);
        let mut log = ContradictionLog::default();
        propagate_observed(&mut b, &catalog, &mut log);

        assert_eq!(a, b);
    }

    #[test]
    fn test_emptied_cell_is_reported() {
        // The outer cells agree on nothing for the middle one.
        let tiles = vec![
            TileDef::new(0, "L").with_rule(Direction::Right, [1u32, 2]),
            TileDef::new(1, "x"),
            TileDef::new(2, "y"),
            TileDef::new(3, "R").with_rule(Direction::Left, [0u32]),
        ];
        let catalog = TileCatalog::new(tiles).unwrap();
        let mut grid = Grid::new(1, 3);
        grid.initialize(&catalog.tile_ids());
        grid.collapse_cell(0, 0, TileId(0));
        grid.collapse_cell(0, 2, TileId(3));

        let mut log = ContradictionLog::default();
        propagate_observed(&mut grid, &catalog, &mut log);

        assert_eq!(grid.contradictions(), vec![(0, 1)]);
        assert_eq!(log.entries, vec![(0, 1, ContradictionKind::Emptied)]);
    }
}
