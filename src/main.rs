//! Authoritative game server (default binary).
//!
//! Configured from `TETRIS_*` environment variables; see
//! [`net_tetris::server`]. Log level follows `RUST_LOG` (default `info`).

use anyhow::Result;
use env_logger::Env;
use log::info;

use net_tetris::server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    info!(
        "starting on {}:{} (mode {}, tick {:?})",
        config.host, config.port, config.mode, config.base_tick
    );
    run_server(config, None).await
}
