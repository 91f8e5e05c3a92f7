//! Client configuration
//!
//! All endpoint urls are derived once from the base http url, so a bad
//! value is reported when the config is built rather than on first use.
//!
//! Environment variables:
//!
//! - `TETRIS_URL`: base http(s) url of the server (default `http://127.0.0.1:8080`)
//! - `TETRIS_MODE`: preset requested via `/ws?mode=`
//! - `TETRIS_RECONNECT_FLOOR_MS`, `TETRIS_RECONNECT_STEP_MS`, `TETRIS_RECONNECT_CEILING_MS`
//! - `TETRIS_POLL_MS`: fallback poll interval (default 300)
//! - `TETRIS_HTTP_TIMEOUT_MS`: per-request timeout for REST calls (default 2000)

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::backoff::BackoffPolicy;
use crate::types::POLL_INTERVAL_MS;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8080";

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid url {value:?}: {source}")]
    Url {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {0:?}, expected http or https")]
    Scheme(String),
    #[error("invalid value {value:?} for {var}")]
    Value { var: &'static str, value: String },
}

/// Endpoints derived from the base url
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub ws: Url,
    pub board: Url,
    pub moves: Url,
    pub highscores: Url,
    pub game_mode: Url,
}

impl Endpoints {
    fn derive(base: &str, mode: Option<&str>) -> Result<Self, ConfigError> {
        let url_err = |source| ConfigError::Url {
            value: base.to_string(),
            source,
        };
        let mut base = Url::parse(base).map_err(url_err)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Scheme(base.scheme().to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| base.join(path).map_err(url_err);
        let mut ws = join("ws")?;
        let ws_scheme = if base.scheme() == "https" { "wss" } else { "ws" };
        ws.set_scheme(ws_scheme)
            .map_err(|_| ConfigError::Scheme(ws_scheme.to_string()))?;
        let mut game_mode = join("getGameMode")?;
        if let Some(mode) = mode {
            ws.query_pairs_mut().append_pair("mode", mode);
            game_mode.query_pairs_mut().append_pair("mode", mode);
        }

        Ok(Self {
            ws,
            board: join("board")?,
            moves: join("move")?,
            highscores: join("highscores")?,
            game_mode,
        })
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub mode: Option<String>,
    pub backoff: BackoffPolicy,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Config for a server at `base_url` with default timings
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::with_mode(base_url, None)
    }

    pub fn with_mode(base_url: &str, mode: Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoints: Endpoints::derive(base_url, mode.as_deref())?,
            mode,
            backoff: BackoffPolicy::default(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = env::var("TETRIS_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let mode = env::var("TETRIS_MODE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut config = Self::with_mode(&base, mode)?;
        let defaults = config.backoff;
        config.backoff = BackoffPolicy {
            floor: env_millis("TETRIS_RECONNECT_FLOOR_MS", defaults.floor)?,
            step: env_millis("TETRIS_RECONNECT_STEP_MS", defaults.step)?,
            ceiling: env_millis("TETRIS_RECONNECT_CEILING_MS", defaults.ceiling)?,
        };
        config.poll_interval = env_millis("TETRIS_POLL_MS", config.poll_interval)?;
        config.http_timeout = env_millis("TETRIS_HTTP_TIMEOUT_MS", config.http_timeout)?;
        Ok(config)
    }
}

/// Read a millisecond duration, falling back to `default` when unset
pub(crate) fn env_millis(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Value { var, value }),
        Err(_) => Ok(default),
    }
}
