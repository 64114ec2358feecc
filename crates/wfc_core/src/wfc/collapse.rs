//! Collapse of a single lowest-entropy cell.

use super::catalog::TileId;
use super::grid::Grid;
use crate::rng::{choose_with_rng, TileRng};

/// Collapse one cell picked uniformly from `candidates`.
///
/// The value is drawn uniformly from the cell's current options, not from
/// the whole catalog. An empty candidate list is a no-op. Returns the
/// placement that was made.
pub fn collapse_one(
    grid: &mut Grid,
    candidates: &[(usize, usize)],
    rng: &mut dyn TileRng,
) -> Option<(usize, usize, TileId)> {
    let &(row, col) = choose_with_rng(candidates, rng)?;
    let tile = *choose_with_rng(grid.options(row, col), rng)?;
    grid.collapse_cell(row, col, tile);
    Some((row, col, tile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StdRandom;

    fn ids(raw: &[u32]) -> Vec<TileId> {
        raw.iter().copied().map(TileId).collect()
    }

    #[test]
    fn test_empty_candidates_is_noop() {
        let mut rng = StdRandom::from_u64_seed(1);
        let mut grid = Grid::square(2);
        grid.initialize(&ids(&[0, 1]));
        let before = grid.clone();

        assert_eq!(collapse_one(&mut grid, &[], &mut rng), None);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_collapse_picks_from_candidates_and_current_options() {
        let mut rng = StdRandom::from_u64_seed(9);
        for _ in 0..50 {
            let mut grid = Grid::new(2, 2);
            grid.initialize(&ids(&[0, 1, 2, 3]));
            grid.narrow(1, 0, &ids(&[1, 3]));
            grid.narrow(1, 1, &ids(&[0, 2]));
            let candidates = [(1, 0), (1, 1)];

            let (row, col, tile) =
                collapse_one(&mut grid, &candidates, &mut rng).expect("candidates present");

            assert!(candidates.contains(&(row, col)));
            let allowed = if col == 0 { ids(&[1, 3]) } else { ids(&[0, 2]) };
            assert!(allowed.contains(&tile));
            assert_eq!(grid.options(row, col), &[tile]);
            assert_eq!(grid.collapsed_count(), 1);
        }
    }

    #[test]
    fn test_collapse_eventually_reaches_every_candidate() {
        let mut rng = StdRandom::from_u64_seed(3);
        let candidates = [(0, 0), (0, 1), (0, 2)];
        let mut seen = [false; 3];
        for _ in 0..100 {
            let mut grid = Grid::new(1, 3);
            grid.initialize(&ids(&[0, 1]));
            if let Some((_, col, _)) = collapse_one(&mut grid, &candidates, &mut rng) {
                seen[col] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
