//! Game state module - the authoritative state machine
//!
//! Ties together board, pieces, RNG and scoring. States are `Active`,
//! `Paused` and `GameOver`; locking is a transient step inside `Active`.
//! Every operation is best-effort: an intent that is illegal in the current
//! state leaves everything untouched and reports `false`.

use crate::board::Board;
use crate::pieces::{collides, mask_for, try_rotate, Mask};
use crate::rng::PieceQueue;
use crate::scoring::line_points;
use crate::snapshot::GameSnapshot;
use crate::types::*;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Create a piece at the spawn anchor
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Mask for the current rotation
    pub fn mask(&self) -> &'static Mask {
        mask_for(self.kind, self.rotation)
    }

    fn fits(&self, board: &Board, x: i8, y: i8) -> bool {
        !collides(board, self.mask(), x, y)
    }
}

/// Lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Active,
    Paused,
    GameOver,
}

/// Outcome of one lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockReport {
    /// Id of the piece that locked
    pub piece_id: u64,
    pub lines_cleared: u32,
    pub points: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: ActivePiece,
    queue: PieceQueue,
    mode: GameMode,
    phase: Phase,
    score: u32,
    lines: u32,
    /// Incremented every time a piece becomes active, across restarts
    piece_id: u64,
    last_lock: Option<LockReport>,
}

impl GameState {
    /// Create a new game with the given RNG seed and mode, 7-bag selection
    pub fn new(seed: u32, mode: GameMode) -> Self {
        Self::with_queue(Board::new(), PieceQueue::new(seed), mode)
    }

    pub fn with_randomizer(seed: u32, mode: GameMode, randomizer: Randomizer) -> Self {
        Self::with_queue(
            Board::new(),
            PieceQueue::with_randomizer(seed, randomizer),
            mode,
        )
    }

    /// Start from a prepared board (the first piece spawns on it)
    pub fn with_board(board: Board, seed: u32, mode: GameMode) -> Self {
        Self::with_queue(board, PieceQueue::new(seed), mode)
    }

    fn with_queue(board: Board, mut queue: PieceQueue, mode: GameMode) -> Self {
        let first = queue.draw();
        let mut state = Self {
            board,
            active: ActivePiece::spawn(first),
            queue,
            mode,
            phase: Phase::Active,
            score: 0,
            lines: 0,
            piece_id: 0,
            last_lock: None,
        };
        state.activate(first);
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> ActivePiece {
        self.active
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn piece_id(&self) -> u64 {
        self.piece_id
    }

    /// Gravity interval for the current mode
    pub fn tick_interval_ms(&self) -> u64 {
        self.mode.tick_interval_ms(BASE_TICK_MS)
    }

    /// Report of the most recent lock, returned at most once
    pub fn take_last_lock(&mut self) -> Option<LockReport> {
        self.last_lock.take()
    }

    /// Apply one intent. Returns whether any state changed.
    pub fn apply(&mut self, intent: &Intent) -> bool {
        match intent {
            Intent::Move(dir) => self.move_piece(*dir),
            Intent::Rotate => self.rotate(),
            Intent::Drop => self.hard_drop(),
            Intent::PauseResume => self.toggle_pause(),
            Intent::Restart { mode } => {
                self.restart(mode.as_deref());
                true
            }
        }
    }

    /// Shift the active piece one cell. `Down` never locks.
    pub fn move_piece(&mut self, dir: MoveDir) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        let (dx, dy) = dir.offset();
        let (nx, ny) = (self.active.x + dx, self.active.y + dy);
        if !self.active.fits(&self.board, nx, ny) {
            return false;
        }
        self.active.x = nx;
        self.active.y = ny;
        true
    }

    /// Rotate clockwise with wall kicks
    pub fn rotate(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        let piece = self.active;
        match try_rotate(&self.board, piece.kind, piece.rotation, piece.x, piece.y) {
            Some((rotation, x)) => {
                self.active.rotation = rotation;
                self.active.x = x;
                true
            }
            None => false,
        }
    }

    /// Advance while the piece fits, then lock immediately
    pub fn hard_drop(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        while self.active.fits(&self.board, self.active.x, self.active.y + 1) {
            self.active.y += 1;
        }
        self.lock();
        true
    }

    /// One gravity step: move down, or lock if blocked
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        if !self.move_piece(MoveDir::Down) {
            self.lock();
        }
        true
    }

    /// Toggle `Active <-> Paused` if the mode allows pausing
    pub fn toggle_pause(&mut self) -> bool {
        if !self.mode.can_pause {
            return false;
        }
        self.phase = match self.phase {
            Phase::Active => Phase::Paused,
            Phase::Paused => Phase::Active,
            Phase::GameOver => return false,
        };
        true
    }

    /// Start over from any state. A named preset replaces the mode.
    pub fn restart(&mut self, mode: Option<&str>) {
        if let Some(name) = mode {
            self.mode = GameMode::from_preset(name);
        }
        self.board.clear();
        self.score = 0;
        self.lines = 0;
        self.last_lock = None;
        self.queue = PieceQueue::with_randomizer(self.queue.seed(), self.queue.randomizer());
        self.phase = Phase::Active;
        let first = self.queue.draw();
        self.activate(first);
    }

    fn lock(&mut self) {
        let piece = self.active;
        let placed = self
            .board
            .lock_mask(piece.mask(), piece.x, piece.y, piece.kind.tag());
        debug_assert!(placed, "active piece overlapped the board at lock");
        let cleared = self.board.clear_full_rows().len();
        let points = line_points(cleared, self.mode.score_multiplier);
        self.score = self.score.saturating_add(points);
        self.lines = self.lines.saturating_add(cleared as u32);
        self.last_lock = Some(LockReport {
            piece_id: self.piece_id,
            lines_cleared: cleared as u32,
            points,
        });

        let next = self.queue.draw();
        self.activate(next);
    }

    fn activate(&mut self, kind: PieceKind) {
        self.active = ActivePiece::spawn(kind);
        self.piece_id += 1;
        if !self.active.fits(&self.board, self.active.x, self.active.y) {
            self.phase = Phase::GameOver;
        }
    }

    /// Upcoming piece kinds, next first
    pub fn next_kinds(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.upcoming()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            piece: *self.active.mask(),
            x: self.active.x,
            y: self.active.y,
            next: self
                .next_kinds()
                .map(|k| *mask_for(k, Rotation::North))
                .collect(),
            score: self.score,
            piece_id: self.piece_id,
            paused: self.paused(),
            game_over: self.game_over(),
            mode: self.mode.clone(),
            lines: Some(self.lines),
        }
    }
}
