// neighbors.rs - Moore-neighbourhood counting without wraparound

use crate::grid::{Coord, Grid};

/// The eight offsets around a cell, top-left to bottom-right.
#[rustfmt::skip]
pub const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Neighbour coordinates of `at` that lie on the grid.
///
/// Positions past an edge are skipped rather than wrapped, so a corner has
/// three neighbours and an edge cell five.
pub fn neighbors(grid: &Grid, at: Coord) -> impl Iterator<Item = Coord> + '_ {
    MOORE_OFFSETS
        .iter()
        .filter_map(move |&(d_row, d_col)| at.offset(d_row, d_col))
        .filter(move |&neighbor| grid.is_valid(neighbor))
}

/// Number of live cells around `at`, in `0..=8`.
pub fn count_live_neighbors(grid: &Grid, at: Coord) -> u8 {
    neighbors(grid, at)
        .filter(|&neighbor| grid.is_alive(neighbor))
        .count() as u8
}
