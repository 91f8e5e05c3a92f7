//! Discrete events derived from consecutive snapshots
//!
//! Consumers that only see snapshots (remote sessions, polling) still want
//! "a piece locked" or "lines were cleared" notifications. [`diff_snapshots`]
//! derives them from two consecutive snapshots so every consumer reads the
//! same transitions.

use arrayvec::ArrayVec;

use crate::scoring::line_points;
use crate::snapshot::GameSnapshot;

/// A transition observed between two snapshots
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// One or more pieces locked; `piece_id` is the last one that did
    PieceLocked { piece_id: u64, count: u64 },
    LinesCleared { count: u32 },
    GameOverEntered { score: u32 },
    PausedToggled { paused: bool },
    /// The game was reset; no other events are derived for this pair
    Restarted { mode: String },
}

fn restarted(prev: &GameSnapshot, cur: &GameSnapshot) -> bool {
    if prev.game_over && !cur.game_over {
        return true;
    }
    if cur.score < prev.score {
        return true;
    }
    if let (Some(p), Some(c)) = (prev.lines, cur.lines) {
        if c < p {
            return true;
        }
    }
    if cur.piece_id > prev.piece_id && prev.paused && !cur.paused {
        // Pieces cannot advance while paused, so only a restart does both.
        return true;
    }
    let no_clear = cur.score == prev.score && cur.lines == prev.lines;
    let emptied = prev.board.filled_count() > 0 && cur.board.filled_count() == 0;
    // A lock without a clear always adds cells, so a new piece over a board
    // that did not grow means the game was reset.
    let advanced_without_lock = cur.piece_id > prev.piece_id
        && !cur.game_over
        && cur.board.filled_count() <= prev.board.filled_count();
    no_clear && (emptied || advanced_without_lock)
}

fn lines_cleared(prev: &GameSnapshot, cur: &GameSnapshot, locked: u64) -> u32 {
    match (prev.lines, cur.lines) {
        (Some(p), Some(c)) => c.saturating_sub(p),
        _ if locked == 1 && cur.score > prev.score => {
            let gained = cur.score - prev.score;
            (1..=4u32)
                .find(|&n| line_points(n as usize, cur.mode.score_multiplier) == gained)
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Events implied by moving from `prev` to `cur`, in a stable order:
/// `Restarted` alone, or any of `PieceLocked`, `LinesCleared`,
/// `GameOverEntered`, then `PausedToggled`.
pub fn diff_snapshots(prev: &GameSnapshot, cur: &GameSnapshot) -> ArrayVec<GameEvent, 4> {
    let mut events = ArrayVec::new();

    if restarted(prev, cur) {
        events.push(GameEvent::Restarted {
            mode: cur.mode.name.clone(),
        });
        return events;
    }

    if cur.piece_id > prev.piece_id {
        let count = cur.piece_id - prev.piece_id;
        events.push(GameEvent::PieceLocked {
            piece_id: cur.piece_id - 1,
            count,
        });
        let lines = lines_cleared(prev, cur, count);
        if lines > 0 {
            events.push(GameEvent::LinesCleared { count: lines });
        }
    }

    if !prev.game_over && cur.game_over {
        events.push(GameEvent::GameOverEntered { score: cur.score });
    }

    if prev.paused != cur.paused {
        events.push(GameEvent::PausedToggled { paused: cur.paused });
    }

    events
}
