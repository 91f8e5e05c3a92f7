use std::env;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use net_tetris_adapter::ConfigError;
use net_tetris_types::BASE_TICK_MS;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Gravity interval at fall speed 1
    pub base_tick: Duration,
    /// Preset the game starts in
    pub mode: String,
    /// Fixed piece sequence seed; derived from the clock when unset
    pub seed: Option<u32>,
    /// JSON file backing the highscore ledger; in memory when unset
    pub highscores_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_tick: Duration::from_millis(BASE_TICK_MS),
            mode: "beginner".to_string(),
            seed: None,
            highscores_path: None,
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parsed<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty(var) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Value { var, value }),
        None => Ok(None),
    }
}

impl ServerConfig {
    /// Create from environment variables
    ///
    /// `TETRIS_HOST`, `TETRIS_PORT`, `TETRIS_TICK_MS`, `TETRIS_MODE`,
    /// `TETRIS_SEED`, `TETRIS_HIGHSCORES_PATH`. Unset variables keep their
    /// defaults; unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: non_empty("TETRIS_HOST").unwrap_or(defaults.host),
            port: parsed("TETRIS_PORT")?.unwrap_or(defaults.port),
            base_tick: parsed::<u64>("TETRIS_TICK_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_tick),
            mode: non_empty("TETRIS_MODE").unwrap_or(defaults.mode),
            seed: parsed("TETRIS_SEED")?,
            highscores_path: non_empty("TETRIS_HIGHSCORES_PATH").map(PathBuf::from),
        })
    }

    /// The configured seed, or one taken from the clock
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}
