//! Latest-snapshot hub
//!
//! Consumer-side holder of the most recent accepted snapshot. Deliveries are
//! applied one at a time on the consumer's context; each accepted snapshot
//! replaces the latest one, runs the snapshot callbacks and then the event
//! callbacks for every transition derived from the previous snapshot.

use std::sync::Arc;

use log::debug;

use crate::core::{diff_snapshots, GameEvent, GameSnapshot};

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Pushed over the live channel
    Push,
    /// Fetched by the fallback poller
    Poll,
}

/// One snapshot tagged with its source
#[derive(Debug, Clone)]
pub struct Delivery {
    pub source: Source,
    pub snapshot: GameSnapshot,
}

impl Delivery {
    pub fn push(snapshot: GameSnapshot) -> Self {
        Self {
            source: Source::Push,
            snapshot,
        }
    }

    pub fn poll(snapshot: GameSnapshot) -> Self {
        Self {
            source: Source::Poll,
            snapshot,
        }
    }
}

type SnapshotCallback = Box<dyn FnMut(&GameSnapshot) + Send>;
type EventCallback = Box<dyn FnMut(&GameEvent) + Send>;

#[derive(Default)]
pub struct SnapshotHub {
    latest: Option<Arc<GameSnapshot>>,
    on_snapshot: Vec<SnapshotCallback>,
    on_event: Vec<EventCallback>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<GameSnapshot>> {
        self.latest.clone()
    }

    pub fn on_snapshot<F>(&mut self, f: F)
    where
        F: FnMut(&GameSnapshot) + Send + 'static,
    {
        self.on_snapshot.push(Box::new(f));
    }

    pub fn on_event<F>(&mut self, f: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.on_event.push(Box::new(f));
    }

    /// Apply one delivery. Returns whether it became the latest snapshot.
    ///
    /// Polled snapshots are dropped while the live channel is open, and when
    /// they repeat the current snapshot exactly.
    pub fn accept(&mut self, delivery: Delivery, live_open: bool) -> bool {
        let Delivery { source, snapshot } = delivery;
        if source == Source::Poll {
            if live_open {
                debug!("dropping polled snapshot: live channel is open");
                return false;
            }
            if self.latest.as_deref() == Some(&snapshot) {
                return false;
            }
        }

        let events = match self.latest.as_deref() {
            Some(prev) => diff_snapshots(prev, &snapshot),
            None => Default::default(),
        };
        let snapshot = Arc::new(snapshot);
        self.latest = Some(Arc::clone(&snapshot));

        for callback in &mut self.on_snapshot {
            callback(&snapshot);
        }
        for event in &events {
            debug!("event: {:?}", event);
            for callback in &mut self.on_event {
                callback(event);
            }
        }
        true
    }
}

impl std::fmt::Debug for SnapshotHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotHub")
            .field("latest_piece_id", &self.latest.as_ref().map(|s| s.piece_id))
            .field("snapshot_callbacks", &self.on_snapshot.len())
            .field("event_callbacks", &self.on_event.len())
            .finish()
    }
}
