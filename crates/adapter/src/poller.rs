//! REST fallback poller
//!
//! While the live session is not open, fetches `GET /board` on a fixed
//! interval and forwards the result into the same delivery channel the
//! session uses. A result that arrives after the session reopened is
//! discarded.

use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use url::Url;

use crate::core::GameSnapshot;
use crate::types::GameMode;
use crate::hub::Delivery;
use crate::protocol::{decode_snapshot, ModeMessage, ProtocolError};
use crate::session::SessionState;

/// Failure of one REST round trip
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// `GET /board`, validated
pub async fn fetch_board(http: &reqwest::Client, url: &Url) -> Result<GameSnapshot, FetchError> {
    let body = http
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(decode_snapshot(&body)?)
}

/// `GET /getGameMode`; fields the server leaves out come from the named preset
pub async fn fetch_mode(http: &reqwest::Client, url: &Url) -> Result<GameMode, FetchError> {
    let message = http
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .json::<ModeMessage>()
        .await?;
    Ok(message.into_mode())
}

pub struct Poller {
    task: JoinHandle<()>,
}

impl Poller {
    /// Spawn the poll loop on the current runtime
    pub fn spawn(
        http: reqwest::Client,
        url: Url,
        interval: Duration,
        state_rx: watch::Receiver<SessionState>,
        deliveries: mpsc::UnboundedSender<Delivery>,
    ) -> Self {
        let task = tokio::spawn(poll_loop(http, url, interval, state_rx, deliveries));
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_loop(
    http: reqwest::Client,
    url: Url,
    interval: Duration,
    mut state_rx: watch::Receiver<SessionState>,
    deliveries: mpsc::UnboundedSender<Delivery>,
) {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let state = *state_rx.borrow_and_update();
        match state {
            SessionState::Closed => break,
            SessionState::Open => {
                // Idle until the live channel drops again.
                if state_rx
                    .wait_for(|s| *s != SessionState::Open)
                    .await
                    .is_err()
                {
                    break;
                }
                ticker.reset();
                continue;
            }
            SessionState::Connecting | SessionState::ClosedRetrying => {}
        }

        ticker.tick().await;
        if *state_rx.borrow() == SessionState::Open {
            continue;
        }

        match fetch_board(&http, &url).await {
            Ok(snapshot) => {
                let now = *state_rx.borrow();
                if matches!(now, SessionState::Open | SessionState::Closed) {
                    debug!("discarding poll result: session is {:?}", now);
                    continue;
                }
                if deliveries.send(Delivery::poll(snapshot)).is_err() {
                    break;
                }
            }
            Err(FetchError::Protocol(e)) => warn!("discarding polled board: {}", e),
            Err(e) => debug!("poll failed: {}", e),
        }
    }
    debug!("poller stopped");
}
