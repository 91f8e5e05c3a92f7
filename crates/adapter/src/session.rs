//! Live duplex session with reconnect
//!
//! [`Session::open`] spawns the connect loop on the current tokio runtime and
//! returns immediately. The loop connects, forwards decoded snapshots into
//! the delivery channel, and on any close or failure waits out the backoff
//! before trying again, until [`Session::close`] is called or the session is
//! dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::backoff::{Backoff, BackoffPolicy};
use crate::hub::Delivery;
use crate::protocol::{decode_snapshot, encode_intent};
use crate::types::Intent;

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Connecting,
    Open,
    /// Waiting out the backoff before the next attempt
    ClosedRetrying,
    /// Closed by the host; terminal
    Closed,
}

type OutboundSlot = Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>;

fn slot(outbound: &OutboundSlot) -> MutexGuard<'_, Option<mpsc::UnboundedSender<String>>> {
    match outbound.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct Session {
    url: Url,
    state_rx: watch::Receiver<SessionState>,
    outbound: OutboundSlot,
    shutdown_tx: watch::Sender<bool>,
}

impl Session {
    /// Start connecting to `url`. Must be called inside a tokio runtime.
    pub fn open(url: Url, policy: BackoffPolicy, deliveries: mpsc::UnboundedSender<Delivery>) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Connecting);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let outbound: OutboundSlot = Arc::new(Mutex::new(None));

        tokio::spawn(connect_loop(
            url.clone(),
            policy,
            state_tx,
            Arc::clone(&outbound),
            deliveries,
            shutdown_rx,
        ));

        Self {
            url,
            state_rx,
            outbound,
            shutdown_tx,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// A receiver observing every state change
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Wait until the session reaches `target`. Returns false if the session
    /// task ended first.
    pub async fn wait_for(&self, target: SessionState) -> bool {
        let mut rx = self.state_rx.clone();
        let reached = rx.wait_for(|s| *s == target).await.is_ok();
        reached
    }

    /// Send one intent. True iff the channel was open at send time; nothing
    /// is queued or retried.
    pub fn send(&self, intent: &Intent) -> bool {
        if !self.is_open() {
            return false;
        }
        let text = match encode_intent(intent) {
            Ok(text) => text,
            Err(e) => {
                warn!("failed to encode {:?}: {}", intent, e);
                return false;
            }
        };
        match slot(&self.outbound).as_ref() {
            Some(tx) => tx.send(text).is_ok(),
            None => false,
        }
    }

    /// Stop the reconnect loop and close the channel. The state becomes
    /// `Closed` once the task has wound down.
    pub fn close(&self) {
        slot(&self.outbound).take();
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.url.as_str())
            .field("state", &self.state())
            .finish()
    }
}

/// Why one connection ended
enum Ended {
    /// Peer closed or the socket failed; retry after backoff
    Lost,
    /// Host asked to stop, or nobody is listening for deliveries any more
    Stop,
}

async fn connect_loop(
    url: Url,
    policy: BackoffPolicy,
    state_tx: watch::Sender<SessionState>,
    outbound: OutboundSlot,
    deliveries: mpsc::UnboundedSender<Delivery>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut backoff = Backoff::new(policy);

    while !*shutdown_rx.borrow() {
        state_tx.send_replace(SessionState::Connecting);

        let attempt = tokio::select! {
            r = tokio_tungstenite::connect_async(url.as_str()) => r,
            _ = shutdown_rx.changed() => break,
        };

        match attempt {
            Ok((stream, _response)) => {
                info!("session open: {}", url);
                backoff.reset();
                let (tx, rx) = mpsc::unbounded_channel::<String>();
                *slot(&outbound) = Some(tx);
                state_tx.send_replace(SessionState::Open);

                let ended = pump_connection(stream, rx, &deliveries, &mut shutdown_rx).await;
                slot(&outbound).take();
                if let Ended::Stop = ended {
                    break;
                }
                info!("session lost: {}", url);
            }
            Err(e) => {
                debug!("connect to {} failed: {}", url, e);
            }
        }

        if *shutdown_rx.borrow() {
            break;
        }
        state_tx.send_replace(SessionState::ClosedRetrying);
        let delay = backoff.next_delay();
        debug!("reconnecting in {:?}", delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_rx.changed() => break,
        }
    }

    slot(&outbound).take();
    state_tx.send_replace(SessionState::Closed);
    info!("session closed: {}", url);
}

async fn pump_connection<S>(
    stream: S,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    deliveries: &mpsc::UnboundedSender<Delivery>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Ended
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => match decode_snapshot(&text) {
                    Ok(snapshot) => {
                        if deliveries.send(Delivery::push(snapshot)).is_err() {
                            return Ended::Stop;
                        }
                    }
                    Err(e) => warn!("discarding snapshot frame: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!("peer closed: {:?}", frame);
                    return Ended::Lost;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("socket error: {}", e);
                    return Ended::Lost;
                }
                None => return Ended::Lost,
            },
            Some(text) = outbound_rx.recv() => {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    warn!("send failed: {}", e);
                    return Ended::Lost;
                }
            }
            _ = shutdown_rx.changed() => {
                let _ = sink.send(Message::Close(None)).await;
                return Ended::Stop;
            }
        }
    }
}
