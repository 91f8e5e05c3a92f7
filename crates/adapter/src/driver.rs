//! Embedded simulation driver
//!
//! Runs one [`GameState`] in a tokio task: gravity ticks every
//! `base_tick / fall_speed`, intents arrive over a channel, and a snapshot is
//! published after every state-changing intent and every tick. The server
//! hosts one driver; a [`Client`](crate::Client) can also run against one
//! in-process.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::core::{GameSnapshot, GameState};
use crate::types::{GameMode, Intent, Randomizer, BASE_TICK_MS};

/// Broadcast capacity; slow subscribers skip ahead to newer snapshots
const SNAPSHOT_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub seed: u32,
    pub mode: GameMode,
    pub randomizer: Randomizer,
    /// Gravity interval at fall speed 1
    pub base_tick: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            mode: GameMode::beginner(),
            randomizer: Randomizer::SevenBag,
            base_tick: Duration::from_millis(BASE_TICK_MS),
        }
    }
}

/// Handle to a running driver. Cheap to clone; the task stops when the last
/// handle is dropped.
#[derive(Clone)]
pub struct DriverHandle {
    intents: mpsc::UnboundedSender<Intent>,
    snapshots: broadcast::Sender<Arc<GameSnapshot>>,
    latest: watch::Receiver<Arc<GameSnapshot>>,
}

impl DriverHandle {
    /// Spawn a driver on the current runtime
    pub fn spawn(config: DriverConfig) -> Self {
        let game = GameState::with_randomizer(config.seed, config.mode, config.randomizer);
        let initial = Arc::new(game.snapshot());

        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (snap_tx, _) = broadcast::channel(SNAPSHOT_BUFFER);
        let (latest_tx, latest_rx) = watch::channel(Arc::clone(&initial));

        tokio::spawn(run(
            game,
            config.base_tick,
            intent_rx,
            snap_tx.clone(),
            latest_tx,
        ));

        Self {
            intents: intent_tx,
            snapshots: snap_tx,
            latest: latest_rx,
        }
    }

    /// Queue an intent. False once the driver task has stopped.
    pub fn apply(&self, intent: Intent) -> bool {
        self.intents.send(intent).is_ok()
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<GameSnapshot> {
        Arc::clone(&*self.latest.borrow())
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<GameSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Latest-value view, for consumers that only care about the newest state
    pub fn watch(&self) -> watch::Receiver<Arc<GameSnapshot>> {
        self.latest.clone()
    }
}

impl std::fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverHandle")
            .field("piece_id", &self.latest.borrow().piece_id)
            .field("subscribers", &self.snapshots.receiver_count())
            .finish()
    }
}

/// Next snapshot from a [`DriverHandle::subscribe`] receiver, `None` once
/// the driver is gone.
///
/// A receiver that fell behind resumes at its oldest retained message, so a
/// lag drains the backlog and yields only the newest snapshot. Delivery
/// order never goes backwards.
pub async fn recv_snapshot(
    rx: &mut broadcast::Receiver<Arc<GameSnapshot>>,
) -> Option<Arc<GameSnapshot>> {
    loop {
        match rx.recv().await {
            Ok(snap) => return Some(snap),
            Err(broadcast::error::RecvError::Closed) => return None,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                let mut newest = None;
                let mut dropped = skipped;
                loop {
                    match rx.try_recv() {
                        Ok(snap) => {
                            if newest.replace(snap).is_some() {
                                dropped += 1;
                            }
                        }
                        Err(broadcast::error::TryRecvError::Lagged(n)) => dropped += n,
                        Err(broadcast::error::TryRecvError::Empty)
                        | Err(broadcast::error::TryRecvError::Closed) => break,
                    }
                }
                debug!("subscriber skipped {} snapshots", dropped);
                if newest.is_some() {
                    return newest;
                }
            }
        }
    }
}

fn gravity_interval(game: &GameState, base: Duration) -> Duration {
    let speed = game.mode().fall_speed.max(1);
    (base / speed).max(Duration::from_millis(1))
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run(
    mut game: GameState,
    base_tick: Duration,
    mut intents: mpsc::UnboundedReceiver<Intent>,
    snapshots: broadcast::Sender<Arc<GameSnapshot>>,
    latest: watch::Sender<Arc<GameSnapshot>>,
) {
    let mut period = gravity_interval(&game, base_tick);
    let mut gravity = ticker(period);
    info!(
        "driver started: mode {} tick {:?}",
        game.mode().name,
        period
    );

    let publish = |game: &mut GameState| {
        if let Some(lock) = game.take_last_lock() {
            debug!(
                "piece {} locked: {} lines, +{}",
                lock.piece_id, lock.lines_cleared, lock.points
            );
        }
        let snap = Arc::new(game.snapshot());
        latest.send_replace(Arc::clone(&snap));
        // No subscribers is fine.
        let _ = snapshots.send(snap);
    };

    loop {
        tokio::select! {
            _ = gravity.tick() => {
                if game.tick() {
                    publish(&mut game);
                }
            }
            intent = intents.recv() => {
                let Some(intent) = intent else { break };
                if !game.apply(&intent) {
                    continue;
                }
                publish(&mut game);
                let next = gravity_interval(&game, base_tick);
                if next != period {
                    debug!("gravity re-armed: {:?} -> {:?}", period, next);
                    period = next;
                    gravity = ticker(period);
                }
            }
        }
    }
    info!("driver stopped");
}
