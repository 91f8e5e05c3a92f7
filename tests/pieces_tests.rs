//! Piece mask, collision and rotation tests

use net_tetris::core::{collides, mask_for, try_rotate, Board, SimpleRng, KICK_OFFSETS};
use net_tetris::types::{PieceKind, Rotation, EMPTY, MASK_SIDE};

const ROTATIONS: [Rotation; 4] = [
    Rotation::North,
    Rotation::East,
    Rotation::South,
    Rotation::West,
];

fn cells(kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> Vec<(i16, i16)> {
    mask_for(kind, rotation)
        .iter()
        .enumerate()
        .filter(|(_, &c)| c != EMPTY)
        .map(|(i, _)| {
            (
                x as i16 + (i % MASK_SIDE) as i16,
                y as i16 + (i / MASK_SIDE) as i16,
            )
        })
        .collect()
}

#[test]
fn test_vertical_i_occupies_one_column() {
    let cols: Vec<i16> = cells(PieceKind::I, Rotation::East, 0, 0)
        .iter()
        .map(|&(x, _)| x)
        .collect();
    assert_eq!(cols, vec![2, 2, 2, 2]);
}

#[test]
fn test_collision_at_walls_and_floor() {
    let board = Board::new();
    let i_north = mask_for(PieceKind::I, Rotation::North);
    assert!(!collides(&board, i_north, 0, 0));
    assert!(!collides(&board, i_north, 6, 0));
    assert!(collides(&board, i_north, 7, 0));
    assert!(collides(&board, i_north, -1, 0));
    // Row 1 of the box is the filled one.
    assert!(!collides(&board, i_north, 0, 18));
    assert!(collides(&board, i_north, 0, 19));
}

#[test]
fn test_empty_mask_cells_may_hang_outside() {
    let board = Board::new();
    let i_east = mask_for(PieceKind::I, Rotation::East);
    // Column 2 of the box is the only filled one.
    assert!(!collides(&board, i_east, -2, 0));
    assert!(!collides(&board, i_east, 7, 0));
    assert!(collides(&board, i_east, 8, 0));
}

#[test]
fn test_collision_matches_cellwise_check() {
    let mut rng = SimpleRng::new(2024);
    let mut board = Board::new();
    for _ in 0..60 {
        let x = rng.next_range(10) as i16;
        let y = 8 + rng.next_range(12) as i16;
        board.set(x, y, 1);
    }

    for _ in 0..500 {
        let kind = PieceKind::ALL[rng.next_range(7) as usize];
        let rotation = ROTATIONS[rng.next_range(4) as usize];
        let x = rng.next_range(14) as i8 - 3;
        let y = rng.next_range(24) as i8 - 3;

        let expected = cells(kind, rotation, x, y)
            .iter()
            .any(|&(px, py)| !board.is_valid(px, py));
        assert_eq!(
            collides(&board, mask_for(kind, rotation), x, y),
            expected,
            "{:?} {:?} at ({}, {})",
            kind,
            rotation,
            x,
            y
        );
    }
}

#[test]
fn test_rotation_prefers_unshifted_position() {
    let board = Board::new();
    assert_eq!(
        try_rotate(&board, PieceKind::T, Rotation::North, 3, 0),
        Some((Rotation::East, 3))
    );
}

#[test]
fn test_rotation_kicks_follow_offset_order() {
    assert_eq!(KICK_OFFSETS, [0, 1, -1, 2, -2]);

    // A vertical I against the right wall needs a kick left to lie flat.
    let board = Board::new();
    assert_eq!(
        try_rotate(&board, PieceKind::I, Rotation::East, 7, 0),
        Some((Rotation::South, 6))
    );
}

#[test]
fn test_rotation_blocked_everywhere() {
    let mut board = Board::new();
    for y in 0..20 {
        for x in 0..10 {
            board.set(x, y, 1);
        }
    }
    for x in 3..7 {
        board.set(x, 1, EMPTY);
    }
    assert_eq!(try_rotate(&board, PieceKind::I, Rotation::North, 3, 0), None);
}

#[test]
fn test_o_piece_never_rotates() {
    let board = Board::new();
    assert_eq!(try_rotate(&board, PieceKind::O, Rotation::North, 3, 0), None);
}
