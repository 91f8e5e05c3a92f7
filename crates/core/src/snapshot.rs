use crate::board::Board;
use crate::pieces::Mask;
use crate::types::{GameMode, NEXT_QUEUE_LEN};

/// Immutable, fully denormalised view of one game state.
///
/// Produced by [`GameState::snapshot`](crate::GameState::snapshot) on the
/// authoritative side and by the wire decoder on the consumer side.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: Board,
    /// Active piece mask at its current rotation
    pub piece: Mask,
    pub x: i8,
    pub y: i8,
    /// Upcoming piece masks (spawn rotation), next first
    pub next: Vec<Mask>,
    pub score: u32,
    pub piece_id: u64,
    pub paused: bool,
    pub game_over: bool,
    pub mode: GameMode,
    /// Running cleared-line count; absent when the producer does not report it
    pub lines: Option<u32>,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: Board::new(),
            piece: [0; 16],
            x: 0,
            y: 0,
            next: Vec::with_capacity(NEXT_QUEUE_LEN),
            score: 0,
            piece_id: 0,
            paused: false,
            game_over: false,
            mode: GameMode::default(),
            lines: None,
        }
    }
}
