//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell holds a piece tag (0 = empty).
//! Uses a flat array for cache locality and zero allocation on the hot path.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::pieces::Mask;
use crate::types::{Cell, BOARD_HEIGHT, BOARD_WIDTH, EMPTY, MASK_SIDE, MAX_TAG};

/// Number of columns as a `usize`
pub const COLS: usize = BOARD_WIDTH as usize;

/// Number of rows as a `usize`
pub const ROWS: usize = BOARD_HEIGHT as usize;

/// Total number of cells on the board
const BOARD_SIZE: usize = COLS * ROWS;

/// Reasons a row-vector board is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board has {0} rows, expected {rows}", rows = ROWS)]
    RowCount(usize),
    #[error("row {row} has {len} cells, expected {cols}", cols = COLS)]
    RowWidth { row: usize, len: usize },
    #[error("cell ({x}, {y}) holds tag {tag}, expected 0..={max}", max = MAX_TAG)]
    Tag { x: usize, y: usize, tag: i64 },
}

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [EMPTY; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i16, y: i16) -> Option<usize> {
        if x < 0 || x >= COLS as i16 || y < 0 || y >= ROWS as i16 {
            return None;
        }
        Some((y as usize) * COLS + (x as usize))
    }

    /// Get cell at position (x, y), `None` if out of bounds
    pub fn get(&self, x: i16, y: i16) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i16, y: i16, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and empty
    #[inline]
    pub fn is_valid(&self, x: i16, y: i16) -> bool {
        matches!(self.get(x, y), Some(EMPTY))
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i16, y: i16) -> bool {
        matches!(self.get(x, y), Some(c) if c != EMPTY)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= ROWS {
            return false;
        }
        let start = y * COLS;
        self.cells[start..start + COLS]
            .iter()
            .all(|&cell| cell != EMPTY)
    }

    /// Clear all full rows in one pass and return their indices (bottom to top).
    ///
    /// Rows above each cleared row shift down; the freed rows at the top are
    /// emptied. Two-pointer scan, no allocation.
    pub fn clear_full_rows(&mut self) -> ArrayVec<usize, ROWS> {
        let mut cleared_rows = ArrayVec::new();
        let mut write_y = ROWS;

        for read_y in (0..ROWS).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * COLS;
                    self.cells
                        .copy_within(src_start..src_start + COLS, write_y * COLS);
                }
            }
        }

        self.cells[..write_y * COLS].fill(EMPTY);
        cleared_rows
    }

    /// Write every non-empty mask cell, translated by (x, y), as `tag`.
    ///
    /// Returns false without touching the board if any such cell is out of
    /// bounds or already occupied.
    pub fn lock_mask(&mut self, mask: &Mask, x: i8, y: i8, tag: Cell) -> bool {
        let cells = || {
            mask.iter().enumerate().filter(|(_, &m)| m != EMPTY).map(|(i, _)| {
                let dx = (i % MASK_SIDE) as i16;
                let dy = (i / MASK_SIDE) as i16;
                (x as i16 + dx, y as i16 + dy)
            })
        };

        if !cells().all(|(px, py)| self.is_valid(px, py)) {
            return false;
        }
        for (px, py) in cells() {
            self.set(px, py, tag);
        }
        true
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row as a slice
    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * COLS;
        &self.cells[start..start + COLS]
    }

    /// Number of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != EMPTY).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Build a board from row vectors, validating dimensions and tags.
    ///
    /// Accepts any integer type so wire values can be checked before
    /// narrowing.
    pub fn from_rows<T>(rows: &[Vec<T>]) -> Result<Self, BoardError>
    where
        T: Copy + Into<i64>,
    {
        if rows.len() != ROWS {
            return Err(BoardError::RowCount(rows.len()));
        }
        let mut board = Self::new();
        for (y, row) in rows.iter().enumerate() {
            if row.len() != COLS {
                return Err(BoardError::RowWidth { row: y, len: row.len() });
            }
            for (x, &value) in row.iter().enumerate() {
                let tag: i64 = value.into();
                if !(0..=i64::from(MAX_TAG)).contains(&tag) {
                    return Err(BoardError::Tag { x, y, tag });
                }
                board.cells[y * COLS + x] = tag as Cell;
            }
        }
        Ok(board)
    }

    /// Convert to row vectors (the wire layout)
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks_exact(COLS).map(<[Cell]>::to_vec).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i16, tag: Cell) {
        for x in 0..COLS as i16 {
            board.set(x, y, tag);
        }
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn test_clear_keeps_partial_rows_in_order() {
        let mut board = Board::new();
        board.set(0, 17, 3);
        fill_row(&mut board, 18, 1);
        board.set(4, 19, 5);

        let cleared = board.clear_full_rows();
        assert_eq!(cleared.as_slice(), &[18]);
        assert_eq!(board.get(0, 18), Some(3));
        assert_eq!(board.get(4, 19), Some(5));
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut board = Board::new();
        fill_row(&mut board, 19, 2);
        board.set(7, 18, 6);
        fill_row(&mut board, 17, 2);
        board.set(1, 16, 7);

        let cleared = board.clear_full_rows();
        assert_eq!(cleared.as_slice(), &[19, 17]);
        assert_eq!(board.get(7, 19), Some(6));
        assert_eq!(board.get(1, 18), Some(7));
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn test_lock_mask_rejects_overlap_atomically() {
        let mut board = Board::new();
        let mut mask = [0u8; 16];
        mask[0] = 1;
        mask[1] = 1;
        board.set(1, 0, 4);

        assert!(!board.lock_mask(&mask, 0, 0, 1));
        assert_eq!(board.get(0, 0), Some(EMPTY));
        assert!(board.lock_mask(&mask, 0, 1, 1));
        assert_eq!(board.get(0, 1), Some(1));
        assert_eq!(board.get(1, 1), Some(1));
    }

    #[test]
    fn test_from_rows_validation() {
        let rows = vec![vec![0i64; COLS]; ROWS];
        assert!(Board::from_rows(&rows).is_ok());

        let short = vec![vec![0i64; COLS]; ROWS - 1];
        assert_eq!(Board::from_rows(&short), Err(BoardError::RowCount(ROWS - 1)));

        let mut narrow = rows.clone();
        narrow[3].pop();
        assert_eq!(
            Board::from_rows(&narrow),
            Err(BoardError::RowWidth { row: 3, len: COLS - 1 })
        );

        let mut bad_tag = rows;
        bad_tag[5][2] = 8;
        assert_eq!(
            Board::from_rows(&bad_tag),
            Err(BoardError::Tag { x: 2, y: 5, tag: 8 })
        );
    }

    #[test]
    fn test_rows_roundtrip() {
        let mut board = Board::new();
        board.set(3, 5, 2);
        board.set(7, 10, 7);
        let back = Board::from_rows(&board.to_rows()).unwrap();
        assert_eq!(back, board);
    }
}
