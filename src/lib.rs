//! Networked Tetris (workspace facade crate).
//!
//! Re-exports the member crates under one name so binaries and integration
//! tests can write `net_tetris::{core, adapter, highscore, server, types}`.

pub use net_tetris_adapter as adapter;
pub use net_tetris_core as core;
pub use net_tetris_highscore as highscore;
pub use net_tetris_server as server;
pub use net_tetris_types as types;
