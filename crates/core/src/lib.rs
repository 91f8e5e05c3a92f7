//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the board model, the piece catalog and the authoritative
//! state machine. It has **zero dependencies** on networking or I/O:
//!
//! - **Deterministic**: the same seed produces the same piece sequence
//! - **Testable**: every rule is exercised by unit tests
//! - **Portable**: runs inside the server, the embedded driver, or a benchmark
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with line clearing
//! - [`pieces`]: 4x4 piece masks, clockwise rotation, the collision predicate and wall kicks
//! - [`rng`]: seeded LCG with 7-bag and uniform piece selection
//! - [`scoring`]: line clear points
//! - [`game_state`]: the gravity / lock / line-clear state machine
//! - [`snapshot`]: immutable views handed to consumers
//! - [`events`]: discrete events derived by diffing two snapshots
//!
//! # Example
//!
//! ```
//! use net_tetris_core::GameState;
//! use net_tetris_core::types::{GameMode, Intent, MoveDir};
//!
//! let mut game = GameState::new(12345, GameMode::beginner());
//! assert!(game.apply(&Intent::Move(MoveDir::Left)));
//! game.apply(&Intent::Drop);
//!
//! let snap = game.snapshot();
//! assert_eq!(snap.piece_id, 2);
//! assert!(!snap.game_over);
//! ```

pub mod board;
pub mod events;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use net_tetris_types as types;

pub use board::{Board, BoardError};
pub use events::{diff_snapshots, GameEvent};
pub use game_state::{ActivePiece, GameState, LockReport, Phase};
pub use pieces::{collides, mask_for, try_rotate, Mask, KICK_OFFSETS};
pub use rng::{PieceQueue, SimpleRng};
pub use scoring::line_points;
pub use snapshot::GameSnapshot;
