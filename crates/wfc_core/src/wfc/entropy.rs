//! Lowest-entropy cell selection.
//!
//! Entropy here is simply the number of remaining options. Collapsed and
//! contradictory cells are never candidates.

use super::grid::Grid;

/// Every cell tied at the smallest option count above one, in row-major order.
///
/// Returns an empty list when no cell has more than one option. Tie-breaking
/// is left to the caller.
pub fn select(grid: &Grid) -> Vec<(usize, usize)> {
    let Some(min) = lowest_entropy(grid) else {
        return Vec::new();
    };

    grid.iter()
        .filter(|(_, cell)| cell.entropy() == min)
        .map(|(pos, _)| pos)
        .collect()
}

/// Smallest option count above one, if any cell has one.
fn lowest_entropy(grid: &Grid) -> Option<usize> {
    grid.iter()
        .map(|(_, cell)| cell.entropy())
        .filter(|&n| n > 1)
        .min()
}
