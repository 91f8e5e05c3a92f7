//! Consumer-facing client
//!
//! Combines the session, the fallback poller and the hub for a remote
//! server, or a local [`DriverHandle`] in embedded mode. Every background
//! task pushes into one ordered delivery channel; the consumer drains it on
//! its own context with [`Client::pump`] or [`Client::next_snapshot`], which
//! is where registered callbacks run.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::ClientConfig;
use crate::core::{GameEvent, GameSnapshot};
use crate::driver::{recv_snapshot, DriverHandle};
use crate::hub::{Delivery, SnapshotHub};
use crate::poller::{fetch_mode, FetchError, Poller};
use crate::protocol::{direction_for, MoveRequest};
use crate::session::{Session, SessionState};
use crate::types::{GameMode, Intent};

/// What happened to a dispatched intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Written to the live channel
    Sent,
    /// Live channel down; posted to `/move` without waiting for the reply
    Posted,
    /// Live channel down and the intent has no REST form
    Dropped,
}

enum Link {
    Remote {
        session: Session,
        poller: Poller,
        http: reqwest::Client,
        moves: Url,
        game_mode: Url,
    },
    Embedded {
        driver: DriverHandle,
        forward: JoinHandle<()>,
    },
}

pub struct Client {
    link: Link,
    hub: SnapshotHub,
    deliveries: mpsc::UnboundedReceiver<Delivery>,
}

impl Client {
    /// Connect to a remote server. Must be called inside a tokio runtime;
    /// returns immediately while the session connects in the background.
    pub fn connect(config: &ClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let session = Session::open(config.endpoints.ws.clone(), config.backoff, tx.clone());
        let poller = Poller::spawn(
            http.clone(),
            config.endpoints.board.clone(),
            config.poll_interval,
            session.watch_state(),
            tx,
        );

        Ok(Self {
            link: Link::Remote {
                session,
                poller,
                http,
                moves: config.endpoints.moves.clone(),
                game_mode: config.endpoints.game_mode.clone(),
            },
            hub: SnapshotHub::new(),
            deliveries: rx,
        })
    }

    /// Run against an in-process driver. Must be called inside a tokio runtime.
    pub fn embedded(driver: DriverHandle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let forward = tokio::spawn(forward_driver(driver.clone(), tx));
        Self {
            link: Link::Embedded { driver, forward },
            hub: SnapshotHub::new(),
            deliveries: rx,
        }
    }

    /// Session state; an embedded client is always `Open`
    pub fn state(&self) -> SessionState {
        match &self.link {
            Link::Remote { session, .. } => session.state(),
            Link::Embedded { .. } => SessionState::Open,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.link {
            Link::Remote { session, .. } => Some(session),
            Link::Embedded { .. } => None,
        }
    }

    fn live(&self) -> bool {
        self.state() == SessionState::Open
    }

    pub fn latest(&self) -> Option<Arc<GameSnapshot>> {
        self.hub.latest()
    }

    pub fn on_snapshot<F>(&mut self, f: F)
    where
        F: FnMut(&GameSnapshot) + Send + 'static,
    {
        self.hub.on_snapshot(f);
    }

    pub fn on_event<F>(&mut self, f: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.hub.on_event(f);
    }

    /// Apply every pending delivery without blocking. Returns how many
    /// became the latest snapshot.
    pub fn pump(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(delivery) = self.deliveries.try_recv() {
            let live = self.live();
            if self.hub.accept(delivery, live) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Wait for the next accepted snapshot. `None` once every producer has
    /// stopped.
    pub async fn next_snapshot(&mut self) -> Option<Arc<GameSnapshot>> {
        loop {
            let delivery = self.deliveries.recv().await?;
            let live = self.live();
            if self.hub.accept(delivery, live) {
                return self.hub.latest();
            }
        }
    }

    /// The mode the game is played in. Remote clients ask the server for the
    /// preset requested on connect, or the current one if none was.
    pub async fn game_mode(&self) -> Result<GameMode, FetchError> {
        match &self.link {
            Link::Embedded { driver, .. } => Ok(driver.latest().mode.clone()),
            Link::Remote {
                http, game_mode, ..
            } => fetch_mode(http, game_mode).await,
        }
    }

    /// Send an intent over the live channel, falling back to `POST /move`
    /// for movement intents while it is down.
    pub fn dispatch(&self, intent: Intent) -> Dispatch {
        let (session, http, moves) = match &self.link {
            Link::Embedded { driver, .. } => {
                return if driver.apply(intent) {
                    Dispatch::Sent
                } else {
                    Dispatch::Dropped
                };
            }
            Link::Remote {
                session,
                http,
                moves,
                ..
            } => (session, http, moves),
        };

        if session.send(&intent) {
            return Dispatch::Sent;
        }
        let Some(direction) = direction_for(&intent) else {
            debug!("dropping {:?}: live channel down", intent);
            return Dispatch::Dropped;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("dropping {:?}: no runtime for the fallback request", intent);
            return Dispatch::Dropped;
        };

        let request = http.post(moves.clone()).json(&MoveRequest {
            direction: direction.to_string(),
        });
        runtime.spawn(async move {
            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => debug!("posted move {}", direction),
                Err(e) => debug!("move {} failed: {}", direction, e),
            }
        });
        Dispatch::Posted
    }

    /// Stop every background task. Idempotent.
    pub fn close(&mut self) {
        match &self.link {
            Link::Remote {
                session, poller, ..
            } => {
                session.close();
                poller.stop();
            }
            Link::Embedded { forward, .. } => forward.abort(),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state())
            .field("hub", &self.hub)
            .finish()
    }
}

async fn forward_driver(driver: DriverHandle, tx: mpsc::UnboundedSender<Delivery>) {
    let mut rx = driver.subscribe();
    if tx.send(Delivery::push((*driver.latest()).clone())).is_err() {
        return;
    }
    loop {
        let Some(snapshot) = recv_snapshot(&mut rx).await else {
            break;
        };
        if tx.send(Delivery::push((*snapshot).clone())).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverConfig;
    use crate::types::MoveDir;
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_embedded_client_follows_driver() {
        let driver = DriverHandle::spawn(DriverConfig {
            base_tick: Duration::from_secs(60),
            ..DriverConfig::default()
        });
        let mut client = Client::embedded(driver);
        let events = Arc::new(Mutex::new(Vec::new()));
        {
            let events = Arc::clone(&events);
            client.on_event(move |e| events.lock().unwrap().push(e.clone()));
        }

        let first = client.next_snapshot().await.unwrap();
        assert_eq!(client.state(), SessionState::Open);

        assert_eq!(client.dispatch(Intent::Move(MoveDir::Right)), Dispatch::Sent);
        let moved = client.next_snapshot().await.unwrap();
        assert_eq!(moved.x, first.x + 1);

        client.dispatch(Intent::Drop);
        let dropped = tokio::time::timeout(Duration::from_secs(2), client.next_snapshot())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dropped.piece_id, first.piece_id + 1);
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, GameEvent::PieceLocked { .. })));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_lagging_embedded_client_stays_in_order() {
        let driver = DriverHandle::spawn(DriverConfig {
            base_tick: Duration::from_secs(60),
            ..DriverConfig::default()
        });
        let mut client = Client::embedded(driver);
        let pieces = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        {
            let pieces = Arc::clone(&pieces);
            client.on_snapshot(move |s| pieces.lock().unwrap().push(s.piece_id));
            let events = Arc::clone(&events);
            client.on_event(move |e| events.lock().unwrap().push(e.clone()));
        }
        client.next_snapshot().await.unwrap();

        // More snapshots than the broadcast buffer holds, all before the
        // forwarding task gets to run.
        for i in 0..120 {
            let dir = if i % 2 == 0 { MoveDir::Right } else { MoveDir::Left };
            client.dispatch(Intent::Move(dir));
        }
        client.dispatch(Intent::Drop);
        tokio::time::sleep(Duration::from_millis(200)).await;
        client.pump();

        let pieces = pieces.lock().unwrap();
        assert!(pieces.windows(2).all(|w| w[0] <= w[1]), "{:?}", pieces);
        assert_eq!(pieces.last(), Some(&2));
        let events = events.lock().unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::Restarted { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::PieceLocked { .. }))
                .count(),
            1
        );
    }
}
