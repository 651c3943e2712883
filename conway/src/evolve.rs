// evolve.rs - Generation step for Conway's Game of Life
//
// Every strategy reads one untouched snapshot and writes a fresh grid, so no
// cell ever sees a neighbour's next state.

use std::io;
use std::sync::Arc;

use serde::Deserialize;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::grid::{Cell, Coord, Grid};
use crate::neighbors::count_live_neighbors;

/// B3/S23: survive on two or three neighbours, birth on exactly three.
pub fn next_state(cell: Cell, live_neighbors: u8) -> Cell {
    match (cell, live_neighbors) {
        (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive, // Survival
        (Cell::Dead, 3) => Cell::Alive,                     // Birth
        _ => Cell::Dead,                                    // Death or stays dead
    }
}

/// Next state of one row of `grid`.
fn next_row(grid: &Grid, row: usize) -> Vec<Cell> {
    let Some(cells) = grid.row(row) else {
        return Vec::new();
    };
    cells
        .iter()
        .enumerate()
        .map(|(col, &cell)| next_state(cell, count_live_neighbors(grid, Coord::at(row, col))))
        .collect()
}

/// The generation after `grid`.
pub fn evolve(grid: &Grid) -> Grid {
    let cells = (0..grid.height())
        .flat_map(|row| next_row(grid, row))
        .collect();
    Grid::from_cells(grid.height(), grid.width(), cells)
}

/// Row coroutine: computes one row of the next generation, yielding between cells.
async fn process_row(row: usize, grid: Arc<Grid>) -> (usize, Vec<Cell>) {
    let mut next = Vec::with_capacity(grid.width());
    if let Some(cells) = grid.row(row) {
        for (col, &cell) in cells.iter().enumerate() {
            next.push(next_state(cell, count_live_neighbors(&grid, Coord::at(row, col))));
            tokio::task::yield_now().await;
        }
    }
    (row, next)
}

/// [`evolve`] with one spawned task per row over a shared snapshot.
///
/// The new grid is only assembled once every row task has finished, so a
/// caller never observes a partially built generation.
pub async fn evolve_rows(grid: Arc<Grid>) -> Grid {
    let handles: Vec<_> = (0..grid.height())
        .map(|row| tokio::spawn(process_row(row, Arc::clone(&grid))))
        .collect();

    let mut rows = vec![Vec::new(); grid.height()];
    for handle in handles {
        match handle.await {
            Ok((row, cells)) => rows[row] = cells,
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }

    Grid::from_cells(grid.height(), grid.width(), rows.concat())
}

/// Which evolution strategy a session runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Serial,
    RowTasks,
}

/// Runs generation steps with the configured [`Strategy`].
///
/// `RowTasks` drives its row coroutines on a current-thread runtime, so rows
/// interleave at each yield but never run in parallel.
#[derive(Debug, Default)]
pub enum Evolver {
    #[default]
    Serial,
    RowTasks(Runtime),
}

impl Evolver {
    pub fn new(strategy: Strategy) -> io::Result<Self> {
        match strategy {
            Strategy::Serial => Ok(Evolver::Serial),
            Strategy::RowTasks => {
                let runtime = Builder::new_current_thread().build()?;
                debug!("started current-thread runtime for row-task evolution");
                Ok(Evolver::RowTasks(runtime))
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Evolver::Serial => Strategy::Serial,
            Evolver::RowTasks(_) => Strategy::RowTasks,
        }
    }

    /// Compute the generation after `grid`. Blocks until it is complete.
    pub fn evolve(&self, grid: &Grid) -> Grid {
        match self {
            Evolver::Serial => evolve(grid),
            Evolver::RowTasks(runtime) => runtime.block_on(evolve_rows(Arc::new(grid.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(text: &str) -> Grid {
        text.parse().unwrap()
    }

    #[test]
    fn rule_table() {
        for n in 0..=8u8 {
            let survives = n == 2 || n == 3;
            assert_eq!(next_state(Cell::Alive, n), Cell::from(survives), "alive with {n}");
            assert_eq!(next_state(Cell::Dead, n), Cell::from(n == 3), "dead with {n}");
        }
    }

    #[test]
    fn isolated_cell_dies() {
        let start = grid("...\n.#.\n...");
        assert_eq!(evolve(&start), Grid::new(3, 3));
    }

    #[test]
    fn dead_cell_with_three_neighbors_is_born() {
        let start = grid(
            "
            #.#
            ...
            .#.
            ",
        );
        let next = evolve(&start);
        assert_eq!(next.get(Coord::new(1, 1)), Ok(Cell::Alive));
    }

    #[test]
    fn survival_band() {
        // Centre cell alive plus `n` of its neighbours, filled in offset order.
        let spots = [
            (0, 0), (0, 1), (0, 2),
            (1, 0),         (1, 2),
            (2, 0), (2, 1), (2, 2),
        ];
        for n in 0..=8 {
            let mut start = Grid::new(3, 3);
            start.set(Coord::new(1, 1), Cell::Alive);
            for &(row, col) in &spots[..n] {
                start.set(Coord::at(row, col), Cell::Alive);
            }
            let next = evolve(&start);
            assert_eq!(
                next.get(Coord::new(1, 1)),
                Ok(Cell::from(n == 2 || n == 3)),
                "alive centre with {n} neighbours"
            );
        }
    }

    #[test]
    fn blinker_has_period_two() {
        let vertical = grid(
            "
            .....
            ..#..
            ..#..
            ..#..
            .....
            ",
        );
        let horizontal = grid(
            "
            .....
            .....
            .###.
            .....
            .....
            ",
        );
        let once = evolve(&vertical);
        assert_eq!(once, horizontal);
        assert_eq!(evolve(&once), vertical);
    }

    #[test]
    fn update_is_simultaneous() {
        // Writing in place would make (0, 1) alive before (1, 0) is counted,
        // keeping (1, 0) alive with two neighbours.
        let start = grid("...\n###\n...");
        assert_eq!(evolve(&start), grid(".#.\n.#.\n.#."));
    }

    #[test]
    fn evolve_leaves_input_untouched() {
        let start = grid("###\n...\n...");
        let copy = start.clone();
        let _ = evolve(&start);
        assert_eq!(start, copy);
    }

    #[test]
    fn empty_grid_evolves_to_empty_grid() {
        assert_eq!(evolve(&Grid::new(0, 0)), Grid::new(0, 0));
        assert_eq!(evolve(&Grid::new(2, 0)), Grid::new(2, 0));
    }

    #[test]
    fn edge_cells_do_not_wrap() {
        // On a torus the far column would feed births on the near edge.
        let start = grid(
            "
            #...#
            #...#
            #...#
            ",
        );
        let next = evolve(&start);
        assert_eq!(
            next,
            grid(
                "
                .....
                ##.##
                .....
                "
            )
        );
    }

    #[tokio::test]
    async fn row_tasks_match_serial() {
        let start = grid(
            "
            ..........
            ...#......
            ....#.....
            ..###.....
            ..........
            ......##..
            ......##..
            ..........
            ",
        );
        let serial = evolve(&start);
        let rows = evolve_rows(Arc::new(start)).await;
        assert_eq!(rows, serial);
    }

    #[test]
    fn row_tasks_stay_on_the_calling_thread() {
        let Evolver::RowTasks(runtime) = Evolver::new(Strategy::RowTasks).unwrap() else {
            panic!("expected a row-task evolver");
        };
        assert_eq!(
            runtime.handle().runtime_flavor(),
            tokio::runtime::RuntimeFlavor::CurrentThread
        );

        let caller = std::thread::current().id();
        let workers = runtime.block_on(async {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    tokio::spawn(async {
                        tokio::task::yield_now().await;
                        std::thread::current().id()
                    })
                })
                .collect();
            let mut ids = Vec::new();
            for handle in handles {
                ids.push(handle.await.unwrap());
            }
            ids
        });
        assert!(workers.iter().all(|&id| id == caller));
    }

    #[test]
    fn evolver_strategies_agree() {
        let serial = Evolver::new(Strategy::Serial).unwrap();
        let tasks = Evolver::new(Strategy::RowTasks).unwrap();
        assert_eq!(tasks.strategy(), Strategy::RowTasks);

        let mut a = grid(".#...\n..#..\n###..\n.....\n.....");
        let mut b = a.clone();
        for _ in 0..8 {
            a = serial.evolve(&a);
            b = tasks.evolve(&b);
            assert_eq!(a, b);
        }
    }
}
