//! Pieces module - tetromino masks, rotation and collision
//!
//! Every piece lives in a 4x4 box stored row-major as 16 tags. The spawn
//! (North) mask of each kind is rotated clockwise inside its box to produce
//! East, South and West; the whole table is computed at compile time.

use crate::board::Board;
use crate::types::{Cell, PieceKind, Rotation, EMPTY, MASK_CELLS, MASK_SIDE};

/// A 4x4 piece mask, row-major
pub type Mask = [Cell; MASK_CELLS];

/// Horizontal offsets tried, in order, when a rotation collides
pub const KICK_OFFSETS: [i8; 5] = [0, 1, -1, 2, -2];

const fn spawn_mask(kind: PieceKind) -> Mask {
    // Rows 1 and 2 of the box; row 0 and 3 stay empty for every kind.
    let (t, row1, row2): (Cell, [u8; 4], [u8; 4]) = match kind {
        PieceKind::I => (1, [1, 1, 1, 1], [0, 0, 0, 0]),
        PieceKind::O => (2, [0, 1, 1, 0], [0, 1, 1, 0]),
        PieceKind::T => (3, [1, 1, 1, 0], [0, 1, 0, 0]),
        PieceKind::S => (4, [0, 1, 1, 0], [1, 1, 0, 0]),
        PieceKind::Z => (5, [1, 1, 0, 0], [0, 1, 1, 0]),
        PieceKind::J => (6, [1, 1, 1, 0], [0, 0, 1, 0]),
        PieceKind::L => (7, [1, 1, 1, 0], [1, 0, 0, 0]),
    };
    let mut mask = [EMPTY; MASK_CELLS];
    let mut x = 0;
    while x < MASK_SIDE {
        mask[MASK_SIDE + x] = row1[x] * t;
        mask[2 * MASK_SIDE + x] = row2[x] * t;
        x += 1;
    }
    mask
}

/// Rotate a mask 90° clockwise inside its box: (x, y) -> (3 - y, x)
pub const fn rotate_mask_cw(mask: &Mask) -> Mask {
    let mut out = [EMPTY; MASK_CELLS];
    let mut y = 0;
    while y < MASK_SIDE {
        let mut x = 0;
        while x < MASK_SIDE {
            out[x * MASK_SIDE + (MASK_SIDE - 1 - y)] = mask[y * MASK_SIDE + x];
            x += 1;
        }
        y += 1;
    }
    out
}

const fn rotations(kind: PieceKind) -> [Mask; 4] {
    let north = spawn_mask(kind);
    let east = rotate_mask_cw(&north);
    let south = rotate_mask_cw(&east);
    let west = rotate_mask_cw(&south);
    [north, east, south, west]
}

static MASKS: [[Mask; 4]; 7] = [
    rotations(PieceKind::I),
    rotations(PieceKind::O),
    rotations(PieceKind::T),
    rotations(PieceKind::S),
    rotations(PieceKind::Z),
    rotations(PieceKind::J),
    rotations(PieceKind::L),
];

/// Precomputed mask for a piece kind and rotation
#[inline]
pub fn mask_for(kind: PieceKind, rotation: Rotation) -> &'static Mask {
    &MASKS[(kind.tag() - 1) as usize][rotation.index()]
}

/// True iff any non-empty mask cell, translated by (x, y), lies outside the
/// board or on an occupied cell. Empty mask cells never collide.
pub fn collides(board: &Board, mask: &Mask, x: i8, y: i8) -> bool {
    mask.iter().enumerate().any(|(i, &cell)| {
        if cell == EMPTY {
            return false;
        }
        let px = x as i16 + (i % MASK_SIDE) as i16;
        let py = y as i16 + (i / MASK_SIDE) as i16;
        !board.is_valid(px, py)
    })
}

/// Try a clockwise rotation with wall kicks.
///
/// Returns the new rotation and anchor column of the first kick offset that
/// does not collide, or `None` if every candidate collides. The O piece never
/// rotates.
pub fn try_rotate(
    board: &Board,
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
) -> Option<(Rotation, i8)> {
    if kind == PieceKind::O {
        return None;
    }
    let next = rotation.rotate_cw();
    let mask = mask_for(kind, next);
    KICK_OFFSETS
        .iter()
        .map(|&dx| x.saturating_add(dx))
        .find(|&nx| !collides(board, mask, nx, y))
        .map(|nx| (next, nx))
}
