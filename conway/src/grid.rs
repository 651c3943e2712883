// grid.rs - Bounded grid for Conway's Game of Life

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// State of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }
}

/// A `(row, col)` position.
///
/// Signed so that neighbour offsets and hand-written pattern data can name
/// positions off the grid; whether a coordinate is usable is always decided
/// by the [`Grid`] it is applied to. Ordering is row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "Vec<isize>")]
pub struct Coord {
    pub row: isize,
    pub col: isize,
}

impl Coord {
    pub const fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }

    /// Coordinate of an in-grid index pair.
    pub const fn at(row: usize, col: usize) -> Self {
        Self::new(row as isize, col as isize)
    }

    /// The coordinate `d_row` rows and `d_col` columns away, or `None` if
    /// that would leave the `isize` range.
    pub const fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        match (self.row.checked_add(d_row), self.col.checked_add(d_col)) {
            (Some(row), Some(col)) => Some(Self::new(row, col)),
            _ => None,
        }
    }

    /// Whether this names a cell of a `height` x `width` grid.
    pub fn is_within(self, height: usize, width: usize) -> bool {
        usize::try_from(self.row).is_ok_and(|row| row < height)
            && usize::try_from(self.col).is_ok_and(|col| col < width)
    }
}

impl From<(isize, isize)> for Coord {
    fn from((row, col): (isize, isize)) -> Self {
        Self::new(row, col)
    }
}

// Pattern files write coordinates as `[row, col]`.
impl TryFrom<Vec<isize>> for Coord {
    type Error = String;

    fn try_from(pair: Vec<isize>) -> Result<Self, Self::Error> {
        match pair.as_slice() {
            &[row, col] => Ok(Self::new(row, col)),
            other => Err(format!(
                "expected a [row, col] pair, found {} value(s)",
                other.len()
            )),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {coord} is outside the {height}x{width} grid")]
    OutOfBounds {
        coord: Coord,
        height: usize,
        width: usize,
    },

    #[error("malformed grid text on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Fixed-size field of cells, stored row-major in one flat buffer.
///
/// Every accessor is bounds-checked: reads outside the grid fail with
/// [`GridError::OutOfBounds`] and writes outside it are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-dead grid of `height` rows by `width` columns.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![Cell::Dead; height * width],
        }
    }

    /// Assemble a grid from a full row-major buffer.
    pub(crate) fn from_cells(height: usize, width: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), height * width, "cell buffer does not match dimensions");
        Self { height, width, cells }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_valid(&self, at: Coord) -> bool {
        self.index(at).is_some()
    }

    fn index(&self, at: Coord) -> Option<usize> {
        at.is_within(self.height, self.width)
            .then(|| at.row as usize * self.width + at.col as usize)
    }

    pub fn get(&self, at: Coord) -> Result<Cell, GridError> {
        self.index(at)
            .map(|index| self.cells[index])
            .ok_or(GridError::OutOfBounds {
                coord: at,
                height: self.height,
                width: self.width,
            })
    }

    /// Alive check that treats anything off the grid as dead.
    pub fn is_alive(&self, at: Coord) -> bool {
        self.get(at).is_ok_and(Cell::is_alive)
    }

    /// Write one cell. Returns `false`, leaving the grid untouched, when
    /// `at` is off the grid.
    pub fn set(&mut self, at: Coord, cell: Cell) -> bool {
        match self.index(at) {
            Some(index) => {
                self.cells[index] = cell;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
    }

    /// Bring every listed cell to life and return how many were skipped for
    /// lying off the grid.
    pub fn seed<I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = Coord>,
    {
        cells
            .into_iter()
            .filter(|&at| !self.set(at, Cell::Alive))
            .count()
    }

    /// One row of cells, or `None` past the last row.
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        (row < self.height).then(|| &self.cells[row * self.width..(row + 1) * self.width])
    }

    /// Rows top to bottom, for renderers.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        (0..self.height).filter_map(move |row| self.row(row))
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Every live coordinate in row-major order.
    pub fn alive_cells(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_alive())
            .map(|(index, _)| Coord::at(index / self.width, index % self.width))
            .collect()
    }
}

/// `#` for alive and `.` for dead, one line per row.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                f.write_str(if cell.is_alive() { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses the [`Display`](fmt::Display) form. Blank lines and surrounding
    /// whitespace are ignored; every row must have the same width.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines.first().map_or(0, |line| line.chars().count());

        let mut cells = Vec::with_capacity(lines.len() * width);
        for (number, line) in lines.iter().enumerate() {
            let before = cells.len();
            for ch in line.chars() {
                cells.push(match ch {
                    '#' => Cell::Alive,
                    '.' => Cell::Dead,
                    other => {
                        return Err(GridError::Malformed {
                            line: number + 1,
                            reason: format!("unexpected character {other:?}"),
                        });
                    }
                });
            }
            if cells.len() - before != width {
                return Err(GridError::Malformed {
                    line: number + 1,
                    reason: format!("expected {width} cells, found {}", cells.len() - before),
                });
            }
        }

        Ok(Self::from_cells(lines.len(), width, cells))
    }
}
