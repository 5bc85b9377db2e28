use serde::{Deserialize, Serialize};

use crate::piece::Piece;

pub const COLS: usize = 10;
pub const ROWS: usize = 20;

/// One grid row, left to right
pub type Line = [u8; COLS];

/// Resting cells of a player's well, row-major, row 0 at the top.
/// 0 is empty, 1..=7 is the value of the piece type that left the cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    cells: [Line; ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            cells: [[0; COLS]; ROWS],
        }
    }

    pub fn rows(&self) -> &[Line; ROWS] {
        &self.cells
    }

    pub fn row(&self, y: usize) -> &Line {
        &self.cells[y]
    }

    pub fn set_row(&mut self, y: usize, line: Line) {
        self.cells[y] = line;
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y][x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.cells[y][x] = value;
    }

    /// True when (x, y) is outside the well or holds a resting cell
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= COLS as i32 || y >= ROWS as i32 {
            return true;
        }
        self.cells[y as usize][x as usize] != 0
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells[y].iter().all(|&cell| cell != 0)
    }

    /// Remove row `y`, shifting every row above it down by one and zeroing row 0
    pub fn remove_row(&mut self, y: usize) {
        for row in (1..=y).rev() {
            self.cells[row] = self.cells[row - 1];
        }
        self.cells[0] = [0; COLS];
    }

    /// Shift every row up by one (row 0 is discarded) and write `line` at the bottom
    pub fn push_bottom(&mut self, line: &Line) {
        self.cells.rotate_left(1);
        self.cells[ROWS - 1] = *line;
    }

    /// Write the piece's in-bounds cells using its type value
    pub fn stamp(&mut self, piece: &Piece) {
        let value = piece.kind.cell_value();
        for (x, y) in piece.cells() {
            if x >= 0 && y >= 0 && x < COLS as i32 && y < ROWS as i32 {
                self.cells[y as usize][x as usize] = value;
            }
        }
    }

    /// Copy of the grid with the piece drawn on top; `self` is left untouched
    pub fn with_piece(&self, piece: &Piece) -> Grid {
        let mut grid = self.clone();
        grid.stamp(piece);
        grid
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|&cell| cell == 0))
    }
}
