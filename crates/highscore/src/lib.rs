//! Highscore ledger
//!
//! A ranked list of `(name, score, when)` entries, ordered by score
//! descending and holding at most [`HIGHSCORE_KEEP`] entries.
//!
//! - [`ranking`]: pure list rules (name normalisation, insertion, qualification)
//! - [`ledger`]: the authoritative list, in memory with optional JSON file persistence
//! - [`client`]: the same interface over HTTP
//!
//! Both sides implement [`HighscoreStore`], so a host can swap a remote
//! server for a local ledger.

pub mod client;
pub mod ledger;
pub mod ranking;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use net_tetris_types::{HIGHSCORE_KEEP, MAX_NAME_LEN};

pub use client::HighscoreClient;
pub use ledger::{Ledger, LedgerError};
pub use ranking::{insert_ranked, normalize_name, qualifies};

/// One ranked entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub score: u32,
    /// UTC time of the submission
    #[serde(with = "time::serde::rfc3339")]
    pub when: OffsetDateTime,
}

/// `POST /highscores` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: String,
    pub score: u32,
}

/// Read/submit interface shared by the HTTP client and the local ledger.
///
/// Failures never surface as errors: a failed list is empty and a failed
/// submit is `false`. Submissions are never retried.
#[allow(async_fn_in_trait)]
pub trait HighscoreStore {
    /// Ranked entries, best first
    async fn list(&self) -> Vec<Entry>;

    async fn submit(&self, name: &str, score: u32) -> bool;

    /// Whether `score` would enter the list, judged against a fresh read
    async fn qualifies(&self, score: u32) -> bool {
        qualifies(&self.list().await, score, HIGHSCORE_KEEP)
    }
}
