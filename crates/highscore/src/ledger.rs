//! Authoritative ledger with optional JSON file persistence
//!
//! The file holds the ranked list as a pretty-printed JSON array. Writes go
//! to `<path>.tmp` first and are renamed over the target, so a crash never
//! leaves a half-written ledger behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;
use time::OffsetDateTime;

use crate::ranking::{insert_ranked, normalize_name};
use crate::{Entry, HighscoreStore, HIGHSCORE_KEEP};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("highscore file: {0}")]
    Io(#[from] io::Error),
    #[error("highscore encoding: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Ledger {
    entries: Vec<Entry>,
    path: Option<PathBuf>,
    keep: usize,
}

impl Ledger {
    /// Ledger that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            path: None,
            keep: HIGHSCORE_KEEP,
        }
    }

    /// Load from `path`. A missing file starts empty; an unreadable one is
    /// logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => match serde_json::from_slice::<Vec<Entry>>(&bytes) {
                Ok(mut entries) => {
                    entries.sort_by(|a, b| b.score.cmp(&a.score));
                    entries.truncate(HIGHSCORE_KEEP);
                    entries
                }
                Err(e) => {
                    warn!("ignoring unreadable highscores in {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!("loaded {} highscores from {}", entries.len(), path.display());
        Ok(Self {
            entries,
            path: Some(path),
            keep: HIGHSCORE_KEEP,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record one score now and persist. Nothing changes if the write fails,
    /// so a retry cannot duplicate the entry.
    pub fn record(&mut self, name: &str, score: u32) -> Result<Entry, LedgerError> {
        self.record_at(name, score, OffsetDateTime::now_utc())
    }

    pub fn record_at(
        &mut self,
        name: &str,
        score: u32,
        when: OffsetDateTime,
    ) -> Result<Entry, LedgerError> {
        let entry = Entry {
            name: normalize_name(name),
            score,
            when,
        };
        let mut candidate = self.entries.clone();
        insert_ranked(&mut candidate, entry.clone(), self.keep);
        if let Some(path) = &self.path {
            write_entries(path, &candidate)?;
        }
        self.entries = candidate;
        Ok(entry)
    }
}

fn write_entries(path: &Path, entries: &[Entry]) -> Result<(), LedgerError> {
    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut bytes = serde_json::to_vec_pretty(entries)?;
    bytes.push(b'\n');
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl Default for Ledger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl HighscoreStore for tokio::sync::Mutex<Ledger> {
    async fn list(&self) -> Vec<Entry> {
        self.lock().await.entries().to_vec()
    }

    async fn submit(&self, name: &str, score: u32) -> bool {
        match self.lock().await.record(name, score) {
            Ok(_) => true,
            Err(e) => {
                warn!("failed to persist highscore: {}", e);
                false
            }
        }
    }
}
