//! Wire protocol: JSON text frames and HTTP bodies
//!
//! Client → server frames are intents tagged by `type`; server → client
//! frames are full snapshots. Decoding validates everything (board
//! dimensions, tag ranges, mask lengths, numeric ranges) before a core
//! [`GameSnapshot`] is built, so nothing partial ever reaches a consumer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Board, BoardError, GameSnapshot, Mask};
use crate::types::{
    GameMode, Intent, MoveDir, BOARD_HEIGHT, BOARD_WIDTH, MASK_CELLS, MASK_SIDE, MAX_TAG,
};

/// Reasons an inbound frame is rejected
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
    #[error("{field} has {len} cells, expected {cells}", cells = MASK_CELLS)]
    MaskLength { field: &'static str, len: usize },
    #[error("{field} holds tag {tag}, expected 0..={max}", max = MAX_TAG)]
    MaskTag { field: &'static str, tag: i64 },
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },
}

/// Move direction with case-insensitive decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireDir(pub MoveDir);

impl<'de> Deserialize<'de> for WireDir {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        MoveDir::from_str(&s)
            .map(WireDir)
            .ok_or_else(|| serde::de::Error::custom("invalid move direction"))
    }
}

impl Serialize for WireDir {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

/// Client → server intent frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntentMessage {
    #[serde(rename = "move")]
    Move { dir: WireDir },
    #[serde(rename = "rotate")]
    Rotate,
    #[serde(rename = "drop")]
    Drop,
    #[serde(rename = "pause/resume")]
    PauseResume,
    #[serde(rename = "restart")]
    Restart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<String>,
    },
}

impl From<&Intent> for IntentMessage {
    fn from(intent: &Intent) -> Self {
        match intent {
            Intent::Move(dir) => IntentMessage::Move { dir: WireDir(*dir) },
            Intent::Rotate => IntentMessage::Rotate,
            Intent::Drop => IntentMessage::Drop,
            Intent::PauseResume => IntentMessage::PauseResume,
            Intent::Restart { mode } => IntentMessage::Restart { mode: mode.clone() },
        }
    }
}

impl From<IntentMessage> for Intent {
    fn from(msg: IntentMessage) -> Self {
        match msg {
            IntentMessage::Move { dir } => Intent::Move(dir.0),
            IntentMessage::Rotate => Intent::Rotate,
            IntentMessage::Drop => Intent::Drop,
            IntentMessage::PauseResume => Intent::PauseResume,
            IntentMessage::Restart { mode } => Intent::Restart { mode },
        }
    }
}

/// Mode descriptor as it appears on the wire.
///
/// Only `ghostPiece` and `nextPreview` are mandatory; the rest fall back to
/// the preset named by `name` (beginner when absent or unknown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ghost_piece: bool,
    pub next_preview: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_pause: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fall_speed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_multiplier: Option<f64>,
}

impl From<&GameMode> for ModeMessage {
    fn from(mode: &GameMode) -> Self {
        Self {
            name: Some(mode.name.clone()),
            ghost_piece: mode.ghost_piece,
            next_preview: mode.next_preview,
            can_pause: Some(mode.can_pause),
            fall_speed: Some(mode.fall_speed),
            score_multiplier: Some(mode.score_multiplier),
        }
    }
}

impl ModeMessage {
    pub fn into_mode(self) -> GameMode {
        let preset = GameMode::from_preset(self.name.as_deref().unwrap_or_default());
        GameMode {
            name: self.name.unwrap_or(preset.name),
            ghost_piece: self.ghost_piece,
            next_preview: self.next_preview,
            can_pause: self.can_pause.unwrap_or(preset.can_pause),
            fall_speed: self.fall_speed.unwrap_or(preset.fall_speed).max(1),
            score_multiplier: self
                .score_multiplier
                .filter(|m| m.is_finite() && *m >= 0.0)
                .unwrap_or(preset.score_multiplier),
        }
    }
}

/// Server → client snapshot frame (also the `GET /board` body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMessage {
    pub board: Vec<Vec<i64>>,
    pub piece: Vec<i64>,
    pub x: i64,
    pub y: i64,
    pub next: Vec<Vec<i64>>,
    pub score: i64,
    pub piece_id: i64,
    pub paused: bool,
    pub game_over: bool,
    pub mode: ModeMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<i64>,
}

impl From<&GameSnapshot> for SnapshotMessage {
    fn from(snap: &GameSnapshot) -> Self {
        let widen = |mask: &Mask| mask.iter().map(|&c| i64::from(c)).collect::<Vec<_>>();
        Self {
            board: snap
                .board
                .to_rows()
                .into_iter()
                .map(|row| row.into_iter().map(i64::from).collect())
                .collect(),
            piece: widen(&snap.piece),
            x: i64::from(snap.x),
            y: i64::from(snap.y),
            next: snap.next.iter().map(widen).collect(),
            score: i64::from(snap.score),
            piece_id: snap.piece_id as i64,
            paused: snap.paused,
            game_over: snap.game_over,
            mode: ModeMessage::from(&snap.mode),
            lines: snap.lines.map(i64::from),
        }
    }
}

fn decode_mask(field: &'static str, cells: &[i64]) -> Result<Mask, ProtocolError> {
    if cells.len() != MASK_CELLS {
        return Err(ProtocolError::MaskLength {
            field,
            len: cells.len(),
        });
    }
    let mut mask = [0; MASK_CELLS];
    for (slot, &tag) in mask.iter_mut().zip(cells) {
        if !(0..=i64::from(MAX_TAG)).contains(&tag) {
            return Err(ProtocolError::MaskTag { field, tag });
        }
        *slot = tag as u8;
    }
    Ok(mask)
}

fn in_range<T: TryFrom<i64>>(
    field: &'static str,
    value: i64,
    range: std::ops::RangeInclusive<i64>,
) -> Result<T, ProtocolError> {
    if !range.contains(&value) {
        return Err(ProtocolError::OutOfRange { field, value });
    }
    T::try_from(value).map_err(|_| ProtocolError::OutOfRange { field, value })
}

impl SnapshotMessage {
    /// Validate and convert into a core snapshot
    pub fn into_snapshot(self) -> Result<GameSnapshot, ProtocolError> {
        let board = Board::from_rows(&self.board)?;
        let piece = decode_mask("piece", &self.piece)?;
        let next = self
            .next
            .iter()
            .map(|m| decode_mask("next", m))
            .collect::<Result<Vec<_>, _>>()?;
        // The anchor may sit up to a box width outside the board while the
        // occupied cells stay inside.
        let side = MASK_SIDE as i64;
        let x = in_range("x", self.x, -side..=i64::from(BOARD_WIDTH))?;
        let y = in_range("y", self.y, -side..=i64::from(BOARD_HEIGHT))?;
        let score = in_range("score", self.score, 0..=i64::from(u32::MAX))?;
        let piece_id = in_range("pieceId", self.piece_id, 0..=i64::MAX)?;
        let lines = self
            .lines
            .map(|l| in_range("lines", l, 0..=i64::from(u32::MAX)))
            .transpose()?;

        Ok(GameSnapshot {
            board,
            piece,
            x,
            y,
            next,
            score,
            piece_id,
            paused: self.paused,
            game_over: self.game_over,
            mode: self.mode.into_mode(),
            lines,
        })
    }
}

/// Decode and validate one snapshot frame
pub fn decode_snapshot(text: &str) -> Result<GameSnapshot, ProtocolError> {
    serde_json::from_str::<SnapshotMessage>(text)?.into_snapshot()
}

pub fn encode_snapshot(snap: &GameSnapshot) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(&SnapshotMessage::from(snap))?)
}

pub fn decode_intent(text: &str) -> Result<Intent, ProtocolError> {
    Ok(serde_json::from_str::<IntentMessage>(text)?.into())
}

pub fn encode_intent(intent: &Intent) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(&IntentMessage::from(intent))?)
}

/// `POST /move` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub direction: String,
}

/// Generic acknowledgement body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
        }
    }
}

/// Map a `POST /move` direction to an intent (case-insensitive)
pub fn intent_from_direction(direction: &str) -> Option<Intent> {
    if let Some(dir) = MoveDir::from_str(direction) {
        Some(Intent::Move(dir))
    } else if direction.eq_ignore_ascii_case("rotate") {
        Some(Intent::Rotate)
    } else if direction.eq_ignore_ascii_case("drop") {
        Some(Intent::Drop)
    } else {
        None
    }
}

/// The `POST /move` direction for an intent, if it has one
pub fn direction_for(intent: &Intent) -> Option<&'static str> {
    match intent {
        Intent::Move(dir) => Some(dir.as_str()),
        Intent::Rotate => Some("rotate"),
        Intent::Drop => Some("drop"),
        Intent::PauseResume | Intent::Restart { .. } => None,
    }
}
