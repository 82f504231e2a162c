//! Grid module - the playfield
//!
//! The grid is a 10x20 array of [`Mino`] stored as a flat row-major array for cache
//! locality and zero allocation. Coordinates are `(x, y)` with x growing to the
//! right and **y growing upward**: row 0 is the floor row.
//!
//! Reads outside the field follow an asymmetric policy that collision checks rely
//! on: the walls (`x < 0`, `x >= WIDTH`) and everything below the floor (`y < 0`)
//! read as [`Mino::Garbage`], while everything above the top (`y >= HEIGHT`) reads
//! as [`Mino::Empty`], so a piece can always rise out of the field but never leave
//! it sideways or downward.

use arrayvec::ArrayVec;

use crate::rotation::{MinoOffset, PieceShape};
use crate::types::{Mino, PieceType, GRID_HEIGHT, GRID_WIDTH};

/// Total number of cells on the grid
const GRID_SIZE: usize = GRID_WIDTH as usize * GRID_HEIGHT as usize;

const WIDTH: usize = GRID_WIDTH as usize;
const HEIGHT: usize = GRID_HEIGHT as usize;

/// The playfield - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Flat array of cells, row-major order (y * WIDTH + x), row 0 at the bottom
    cells: [Mino; GRID_SIZE],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [Mino::Empty; GRID_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= GRID_WIDTH as i8 || y < 0 || y >= GRID_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        GRID_WIDTH
    }

    pub fn height(&self) -> u8 {
        GRID_HEIGHT
    }

    /// Read a cell. Walls and floor read as `Garbage`, the sky as `Empty`.
    pub fn get(&self, x: i8, y: i8) -> Mino {
        if x < 0 || x >= GRID_WIDTH as i8 || y < 0 {
            return Mino::Garbage;
        }
        match Self::index(x, y) {
            Some(idx) => self.cells[idx],
            None => Mino::Empty,
        }
    }

    /// Write a cell. Returns false (and writes nothing) outside the field.
    pub fn set(&mut self, x: i8, y: i8, mino: Mino) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = mino;
                true
            }
            None => false,
        }
    }

    /// True if any cell of `shape` placed at `pos` reads as non-empty
    pub fn overlaps(&self, pos: MinoOffset, shape: &PieceShape) -> bool {
        shape
            .iter()
            .any(|&(dx, dy)| !self.get(pos.0 + dx, pos.1 + dy).is_empty())
    }

    /// Write `piece` into every cell of `shape` at `pos`.
    ///
    /// Does not check legality. Cells below the floor are skipped, cells above the
    /// top are dropped by `set`.
    pub fn stamp(&mut self, pos: MinoOffset, shape: &PieceShape, piece: PieceType) {
        for &(dx, dy) in shape {
            let (x, y) = (pos.0 + dx, pos.1 + dy);
            if y < 0 {
                continue;
            }
            self.set(x, y, Mino::from(piece));
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: i8) -> bool {
        match self.row(y) {
            Some(row) => row.iter().all(|cell| !cell.is_empty()),
            None => false,
        }
    }

    /// Full rows, lowest first. A single piece can complete at most four.
    pub fn full_rows(&self) -> ArrayVec<i8, 4> {
        let mut rows = ArrayVec::new();
        for y in 0..GRID_HEIGHT as i8 {
            if self.is_row_full(y) && rows.try_push(y).is_err() {
                break;
            }
        }
        rows
    }

    /// Empty every cell of row `y`
    pub fn clear_row(&mut self, y: i8) {
        if let Some(start) = Self::index(0, y) {
            self.cells[start..start + WIDTH].fill(Mino::Empty);
        }
    }

    /// Shift every row above `y` down by one, overwriting row `y`.
    ///
    /// The top row becomes empty.
    pub fn drop_row(&mut self, y: i8) {
        let Some(start) = Self::index(0, y) else {
            return;
        };
        // copy_within handles the overlapping ranges
        self.cells.copy_within(start + WIDTH.., start);
        self.cells[GRID_SIZE - WIDTH..].fill(Mino::Empty);
    }

    /// Index of the highest occupied row plus one; zero for an empty grid
    pub fn stack_height(&self) -> usize {
        (0..HEIGHT)
            .rev()
            .find(|&y| {
                self.cells[y * WIDTH..(y + 1) * WIDTH]
                    .iter()
                    .any(|cell| !cell.is_empty())
            })
            .map_or(0, |y| y + 1)
    }

    /// Borrow one row, bottom row first
    pub fn row(&self, y: i8) -> Option<&[Mino]> {
        Self::index(0, y).map(|start| &self.cells[start..start + WIDTH])
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Mino] {
        &self.cells
    }

    /// Copy the grid into a row-major 2D array, row 0 first
    pub fn write_rows(&self, out: &mut [[Mino; WIDTH]; HEIGHT]) {
        for (y, row) in out.iter_mut().enumerate() {
            row.copy_from_slice(&self.cells[y * WIDTH..(y + 1) * WIDTH]);
        }
    }

    /// Build a grid from text rows written top to bottom, as they read on screen.
    ///
    /// The last string is row 0. `.` and space are empty, `#` is garbage, and the
    /// piece letters map to their piece cells. Missing rows and columns stay empty.
    ///
    /// ```
    /// use tetrion_core::Grid;
    /// use tetrion_core::types::Mino;
    ///
    /// let grid = Grid::from_rows(&["#........#", "####.#####"]);
    /// assert_eq!(grid.get(4, 0), Mino::Empty);
    /// assert_eq!(grid.get(0, 1), Mino::Garbage);
    /// assert_eq!(grid.stack_height(), 2);
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut grid = Self::new();
        for (i, line) in rows.iter().rev().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let mino = match ch {
                    '#' | 'G' => Mino::Garbage,
                    'I' => Mino::I,
                    'L' => Mino::L,
                    'O' => Mino::O,
                    'Z' => Mino::Z,
                    'T' => Mino::T,
                    'J' => Mino::J,
                    'S' => Mino::S,
                    _ => Mino::Empty,
                };
                grid.set(x as i8, i as i8, mino);
            }
        }
        grid
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.cells.fill(Mino::Empty);
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
