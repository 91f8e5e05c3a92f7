//! Highscores over HTTP
//!
//! `GET /highscores` returns the ranked list, `POST /highscores` submits one
//! `{name, score}`. The last fetched list is cached for callers that accept a
//! possibly stale answer.

use std::sync::Mutex;
use std::time::Duration;

use log::{debug, warn};
use url::Url;

use crate::ranking::qualifies;
use crate::{Entry, HighscoreStore, Submission, HIGHSCORE_KEEP};

#[derive(Debug)]
pub struct HighscoreClient {
    http: reqwest::Client,
    url: Url,
    cache: Mutex<Option<Vec<Entry>>>,
}

impl HighscoreClient {
    /// Client for the `/highscores` endpoint at `url`
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, url))
    }

    /// Share an existing connection pool
    pub fn with_http(http: reqwest::Client, url: Url) -> Self {
        Self {
            http,
            url,
            cache: Mutex::new(None),
        }
    }

    fn store_cache(&self, list: Option<Vec<Entry>>) {
        match self.cache.lock() {
            Ok(mut guard) => *guard = list,
            Err(poisoned) => *poisoned.into_inner() = list,
        }
    }

    /// The list from the last successful fetch, if any
    pub fn cached(&self) -> Option<Vec<Entry>> {
        match self.cache.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn fetch(&self) -> Result<Vec<Entry>, reqwest::Error> {
        self.http
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Entry>>()
            .await
    }

    async fn post(&self, name: &str, score: u32) -> Result<(), reqwest::Error> {
        self.http
            .post(self.url.clone())
            .json(&Submission {
                name: name.to_string(),
                score,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Qualification against the cached list.
    ///
    /// Racy: another player may have submitted since the cache was filled,
    /// so this can say yes when a fresh read would say no. Use
    /// [`HighscoreStore::qualifies`] when it matters. Fetches once if the
    /// cache is empty.
    pub async fn qualifies_cached(&self, score: u32) -> bool {
        let list = match self.cached() {
            Some(list) => list,
            None => self.list().await,
        };
        qualifies(&list, score, HIGHSCORE_KEEP)
    }
}

impl HighscoreStore for HighscoreClient {
    async fn list(&self) -> Vec<Entry> {
        match self.fetch().await {
            Ok(list) => {
                self.store_cache(Some(list.clone()));
                list
            }
            Err(e) => {
                warn!("fetching highscores failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn submit(&self, name: &str, score: u32) -> bool {
        if let Err(e) = self.post(name, score).await {
            warn!("submitting highscore failed: {}", e);
            return false;
        }
        self.store_cache(None);
        let refreshed = self.list().await;
        debug!("highscores refreshed: {} entries", refreshed.len());
        true
    }
}
