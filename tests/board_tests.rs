//! Board tests

use net_tetris::core::{Board, BoardError};
use net_tetris::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH, EMPTY};

fn fill_row(board: &mut Board, y: i16, tag: u8) {
    for x in 0..BOARD_WIDTH as i16 {
        board.set(x, y, tag);
    }
}

#[test]
fn test_board_new_empty() {
    let board = Board::new();
    for y in 0..BOARD_HEIGHT as i16 {
        for x in 0..BOARD_WIDTH as i16 {
            assert!(board.is_valid(x, y), "Cell ({}, {}) should be valid", x, y);
            assert_eq!(board.get(x, y), Some(EMPTY));
        }
    }
    assert_eq!(board.filled_count(), 0);
}

#[test]
fn test_board_out_of_bounds() {
    let mut board = Board::new();
    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, -1), None);
    assert_eq!(board.get(BOARD_WIDTH as i16, 0), None);
    assert_eq!(board.get(0, BOARD_HEIGHT as i16), None);
    assert!(!board.set(-1, 0, 1));
    assert!(!board.set(0, BOARD_HEIGHT as i16, 1));
    assert!(!board.is_valid(-1, 5));
    assert!(!board.is_occupied(-1, 5));
}

#[test]
fn test_board_set_and_occupancy() {
    let mut board = Board::new();
    assert!(board.set(5, 10, PieceKind::T.tag()));
    assert_eq!(board.get(5, 10), Some(PieceKind::T.tag()));
    assert!(board.is_occupied(5, 10));
    assert!(!board.is_valid(5, 10));

    assert!(board.set(5, 10, EMPTY));
    assert!(board.is_valid(5, 10));
}

#[test]
fn test_clear_single_bottom_row() {
    let mut board = Board::new();
    fill_row(&mut board, 19, 3);
    board.set(4, 18, 6);

    let cleared = board.clear_full_rows();
    assert_eq!(cleared.as_slice(), &[19]);
    assert_eq!(board.get(4, 19), Some(6));
    assert_eq!(board.filled_count(), 1);
}

#[test]
fn test_clear_non_adjacent_rows_shifts_by_count() {
    let mut board = Board::new();
    fill_row(&mut board, 19, 1);
    fill_row(&mut board, 17, 2);
    board.set(0, 18, 4);
    board.set(9, 16, 5);
    board.set(2, 10, 7);

    let cleared = board.clear_full_rows();
    assert_eq!(cleared.as_slice(), &[19, 17]);
    // Row 18 moves down one, rows above 17 move down two.
    assert_eq!(board.get(0, 19), Some(4));
    assert_eq!(board.get(9, 18), Some(5));
    assert_eq!(board.get(2, 12), Some(7));
    assert!(board.row(0).iter().all(|&c| c == EMPTY));
    assert!(board.row(1).iter().all(|&c| c == EMPTY));
    assert_eq!(board.filled_count(), 3);
}

#[test]
fn test_clear_four_rows() {
    let mut board = Board::new();
    for y in 16..20 {
        fill_row(&mut board, y, 1);
    }
    board.set(3, 15, 2);
    assert_eq!(board.clear_full_rows().len(), 4);
    assert_eq!(board.get(3, 19), Some(2));
    assert_eq!(board.filled_count(), 1);
}

#[test]
fn test_clear_nothing_is_a_noop() {
    let mut board = Board::new();
    board.set(0, 19, 1);
    let before = board.clone();
    assert!(board.clear_full_rows().is_empty());
    assert_eq!(board, before);
}

#[test]
fn test_rows_round_trip_and_validation() {
    let mut board = Board::new();
    board.set(9, 19, 7);
    let rows = board.to_rows();
    assert_eq!(rows.len(), BOARD_HEIGHT as usize);
    assert_eq!(rows[19][9], 7);
    assert_eq!(Board::from_rows(&rows).unwrap(), board);

    let short: Vec<Vec<i64>> = vec![vec![0; 10]; 19];
    assert_eq!(Board::from_rows(&short), Err(BoardError::RowCount(19)));

    let mut narrow: Vec<Vec<i64>> = vec![vec![0; 10]; 20];
    narrow[4] = vec![0; 9];
    assert_eq!(
        Board::from_rows(&narrow),
        Err(BoardError::RowWidth { row: 4, len: 9 })
    );

    let mut bad_tag: Vec<Vec<i64>> = vec![vec![0; 10]; 20];
    bad_tag[2][3] = 8;
    assert_eq!(
        Board::from_rows(&bad_tag),
        Err(BoardError::Tag { x: 3, y: 2, tag: 8 })
    );
}
