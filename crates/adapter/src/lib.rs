//! Session and transport layer
//!
//! Keeps a remote viewer consistent with an authoritative simulation despite
//! network interruption.
//!
//! # Channels
//!
//! 1. **Live session**: a WebSocket at `/ws` carrying JSON text frames.
//!    Intents go up, one full snapshot per frame comes down. Reconnects with
//!    linear backoff (1000 ms floor, +500 ms per failure, 5000 ms cap).
//! 2. **Fallback poll**: while the session is not open, `GET /board` every
//!    300 ms. Polled snapshots never override a live one.
//! 3. **Intent fallback**: movement intents sent while the session is down
//!    are posted to `POST /move` instead.
//!
//! # Message Types
//!
//! ```text
//! Client -> Server: {"type":"move","dir":"left"}
//! Client -> Server: {"type":"restart","mode":"classic"}
//! Server -> Client: {"board":[[0,..],..],"piece":[..16],"x":3,"y":0,"next":[[..16],..],
//!                    "score":0,"pieceId":1,"paused":false,"gameOver":false,
//!                    "mode":{"name":"Beginner","ghostPiece":true,"nextPreview":true,...},"lines":0}
//! ```
//!
//! # Ordering
//!
//! The session, the poller and the embedded driver never touch consumer
//! state. They push [`Delivery`] values into one ordered channel, and the
//! consumer applies them one at a time through [`Client::pump`] or
//! [`Client::next_snapshot`]. Registered callbacks run there.
//!
//! # Hosts without an async runtime
//!
//! [`SyncClient`] owns its own tokio runtime and exposes the same surface
//! with blocking waits.

pub mod backoff;
pub mod client;
pub mod config;
pub mod driver;
pub mod hub;
pub mod poller;
pub mod protocol;
pub mod runtime;
pub mod session;

pub use net_tetris_core as core;
pub use net_tetris_types as types;

pub use backoff::{Backoff, BackoffPolicy};
pub use client::{Client, Dispatch};
pub use config::{ClientConfig, ConfigError, Endpoints};
pub use driver::{recv_snapshot, DriverConfig, DriverHandle};
pub use hub::{Delivery, SnapshotHub, Source};
pub use poller::{fetch_board, fetch_mode, FetchError, Poller};
pub use protocol::*;
pub use runtime::SyncClient;
pub use session::{Session, SessionState};
