//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (simulation, transport, authoritative server).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19)
//! - **Spawn anchor**: (3, 0), i.e. `BOARD_WIDTH / 2 - 2`
//!
//! # Piece Tags
//!
//! Board cells and piece masks hold a small integer tag:
//!
//! | Tag | Piece |
//! |-----|-------|
//! | 0 | empty |
//! | 1 | I |
//! | 2 | O |
//! | 3 | T |
//! | 4 | S |
//! | 5 | Z |
//! | 6 | J |
//! | 7 | L |
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_TICK_MS` | 600 | Gravity interval at fall speed 1 |
//! | `RECONNECT_FLOOR_MS` | 1000 | First reconnect delay |
//! | `RECONNECT_STEP_MS` | 500 | Added per consecutive failure |
//! | `RECONNECT_CEILING_MS` | 5000 | Reconnect delay cap |
//! | `POLL_INTERVAL_MS` | 300 | Fallback `/board` poll interval |
//!
//! # Examples
//!
//! ```
//! use net_tetris_types::{GameMode, Intent, MoveDir, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_tag(3), Some(PieceKind::T));
//! assert_eq!(PieceKind::T.tag(), 3);
//!
//! let intent = Intent::Move(MoveDir::Left);
//! assert_eq!(MoveDir::from_str("LEFT"), Some(MoveDir::Left));
//! assert!(matches!(intent, Intent::Move(MoveDir::Left)));
//!
//! assert!(GameMode::classic().score_multiplier > GameMode::beginner().score_multiplier);
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Side length of a piece mask (pieces live in a 4x4 box)
pub const MASK_SIDE: usize = 4;

/// Number of cells in a piece mask
pub const MASK_CELLS: usize = MASK_SIDE * MASK_SIDE;

/// Highest valid cell tag (one per piece kind)
pub const MAX_TAG: u8 = 7;

/// Number of upcoming pieces carried in every snapshot
pub const NEXT_QUEUE_LEN: usize = 3;

/// Spawn anchor column
pub const SPAWN_X: i8 = (BOARD_WIDTH / 2) as i8 - 2;

/// Spawn anchor row
pub const SPAWN_Y: i8 = 0;

/// Gravity interval at fall speed 1 (milliseconds per row)
pub const BASE_TICK_MS: u64 = 600;

/// Number of highscore entries the ledger retains
pub const HIGHSCORE_KEEP: usize = 10;

/// Longest accepted highscore name (characters)
pub const MAX_NAME_LEN: usize = 20;

/// Name recorded when a submission carries a blank name
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// First reconnect delay, also the value the backoff resets to after an open
pub const RECONNECT_FLOOR_MS: u64 = 1000;

/// Increment added to the reconnect delay after each consecutive failure
pub const RECONNECT_STEP_MS: u64 = 500;

/// Upper bound for the reconnect delay
pub const RECONNECT_CEILING_MS: u64 = 5000;

/// Fallback poll interval while the duplex channel is down
pub const POLL_INTERVAL_MS: u64 = 300;

/// Line clear scoring table at multiplier 1.0
///
/// Base points for clearing N lines in one lock, `100 * N^2`:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 400 points
/// - 3 lines: 900 points
/// - 4 lines: 1600 points
pub const LINE_SCORES: [u32; 5] = [0, 100, 400, 900, 1600];

/// A cell on the game board or in a piece mask (0 = empty)
pub type Cell = u8;

/// The empty cell tag
pub const EMPTY: Cell = 0;

/// The seven tetromino piece kinds
///
/// Each piece has a distinct shape and a tag used on the board:
/// - **I** (1): horizontal bar
/// - **O** (2): 2x2 square
/// - **T** (3): T-shaped
/// - **S** (4): S-shaped
/// - **Z** (5): Z-shaped (mirror of S)
/// - **J** (6): J-shaped
/// - **L** (7): L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in tag order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Board tag written when this piece locks
    pub fn tag(&self) -> Cell {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    /// Inverse of [`PieceKind::tag`]; `None` for the empty tag or out-of-range values
    pub fn from_tag(tag: Cell) -> Option<Self> {
        match tag {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::O),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::J),
            7 => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Rotation states of a piece inside its 4x4 box
///
/// - **North**: Spawn orientation (0° rotation)
/// - **East**: Rotated 90° clockwise
/// - **South**: Rotated 180°
/// - **West**: Rotated 270° clockwise
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use net_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Number of clockwise quarter turns from North
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

/// Direction of a `move` intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDir {
    Left,
    Right,
    Down,
}

impl MoveDir {
    /// Anchor offset `(dx, dy)` for one step in this direction
    pub fn offset(&self) -> (i8, i8) {
        match self {
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Down => (0, 1),
        }
    }

    /// Parse direction from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("left") {
            Some(MoveDir::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Some(MoveDir::Right)
        } else if s.eq_ignore_ascii_case("down") {
            Some(MoveDir::Down)
        } else {
            None
        }
    }

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDir::Left => "left",
            MoveDir::Right => "right",
            MoveDir::Down => "down",
        }
    }
}

/// Player-issued commands applied to the authoritative state machine
///
/// Every intent is best-effort: an intent that is illegal in the current
/// state is dropped without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Shift the active piece one cell
    Move(MoveDir),
    /// Rotate clockwise (with wall kicks)
    Rotate,
    /// Hard drop and lock immediately
    Drop,
    /// Toggle pause
    PauseResume,
    /// Start over, optionally switching to a named mode preset
    Restart { mode: Option<String> },
}

impl Intent {
    /// Lowercase wire `type` for this intent
    pub fn kind_str(&self) -> &'static str {
        match self {
            Intent::Move(_) => "move",
            Intent::Rotate => "rotate",
            Intent::Drop => "drop",
            Intent::PauseResume => "pause/resume",
            Intent::Restart { .. } => "restart",
        }
    }
}

/// Next-piece selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Randomizer {
    /// Shuffle all seven kinds, drain, reshuffle. Bounds repeat streaks at 2.
    #[default]
    SevenBag,
    /// Independent uniform draws. No streak bound.
    Uniform,
}

/// Difficulty / feature descriptor carried by every snapshot
///
/// Read-only to consumers; the authoritative side applies `can_pause`,
/// `fall_speed` and `score_multiplier`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMode {
    pub name: String,
    pub ghost_piece: bool,
    pub next_preview: bool,
    pub can_pause: bool,
    /// Divisor applied to [`BASE_TICK_MS`] for the gravity interval
    pub fall_speed: u32,
    pub score_multiplier: f64,
}

impl GameMode {
    /// Forgiving preset: ghost piece, preview and pausing enabled
    pub fn beginner() -> Self {
        Self {
            name: "Beginner".to_string(),
            ghost_piece: true,
            next_preview: true,
            can_pause: true,
            fall_speed: 1,
            score_multiplier: 1.0,
        }
    }

    /// Faster preset without aids or pausing, scoring 1.5x
    pub fn classic() -> Self {
        Self {
            name: "Classic".to_string(),
            ghost_piece: false,
            next_preview: false,
            can_pause: false,
            fall_speed: 3,
            score_multiplier: 1.5,
        }
    }

    /// Resolve a preset by name (case-insensitive); unknown names map to beginner
    pub fn from_preset(name: &str) -> Self {
        if name.eq_ignore_ascii_case("classic") {
            Self::classic()
        } else {
            Self::beginner()
        }
    }

    /// Gravity interval for this mode in milliseconds
    pub fn tick_interval_ms(&self, base_ms: u64) -> u64 {
        (base_ms / u64::from(self.fall_speed.max(1))).max(1)
    }
}

impl Default for GameMode {
    fn default() -> Self {
        Self::beginner()
    }
}
