//! Authoritative server
//!
//! Hosts one shared game driver behind HTTP and WebSocket endpoints:
//!
//! | Route | Method | Body / reply |
//! |-------|--------|--------------|
//! | `/ws[?mode=<preset>]` | GET (upgrade) | intents up, snapshots down |
//! | `/board` | GET | latest snapshot |
//! | `/move` | POST | `{"direction":"left"\|"right"\|"down"\|"rotate"\|"drop"}` → `{"ok":true}` |
//! | `/highscores` | GET | `[{name, score, when}]` |
//! | `/highscores` | POST | `{name, score}` → `{"ok":true}` |
//! | `/getGameMode[?mode=<preset>]` | GET | mode descriptor |
//!
//! The `mode` query on `/ws` sets that connection's default preset for a
//! `restart` that names none. If the shared game is over, or fresh with
//! nothing placed, connecting also restarts it in that preset; a game in
//! progress is joined as-is.
//!
//! A highscore that cannot be written to the ledger file is not recorded and
//! the POST answers 500 with `{"ok":false}`.
//!
//! # Environment Variables
//!
//! - `TETRIS_HOST`: Bind address (default: "127.0.0.1")
//! - `TETRIS_PORT`: Port number (default: 8080)
//! - `TETRIS_TICK_MS`: Gravity interval at fall speed 1 (default: 600)
//! - `TETRIS_MODE`: Starting preset (default: "beginner")
//! - `TETRIS_SEED`: Fixed piece sequence seed
//! - `TETRIS_HIGHSCORES_PATH`: JSON file for the highscore ledger

pub mod config;
pub mod server;

pub use config::ServerConfig;
pub use server::{router, run_server, run_server_until, AppState};
