//! Blocking bridge.
//!
//! Owns a tokio runtime so hosts with a synchronous frame loop can drive a
//! [`Client`] without an async context of their own.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::client::{Client, Dispatch};
use crate::config::ClientConfig;
use crate::core::{GameEvent, GameSnapshot};
use crate::driver::{DriverConfig, DriverHandle};
use crate::session::SessionState;
use crate::types::Intent;

/// Client plus the runtime its tasks run on.
pub struct SyncClient {
    // Dropped first so its tasks are cancelled while the runtime is alive.
    client: Client,
    rt: Runtime,
}

impl SyncClient {
    /// Connect to a remote server.
    pub fn connect(config: &ClientConfig) -> anyhow::Result<Self> {
        let rt = Runtime::new()?;
        let client = {
            let _guard = rt.enter();
            Client::connect(config)?
        };
        Ok(Self { client, rt })
    }

    /// Connect using `ClientConfig::from_env`.
    pub fn connect_from_env() -> anyhow::Result<Self> {
        Self::connect(&ClientConfig::from_env()?)
    }

    /// Run the state machine in-process.
    pub fn embedded(config: DriverConfig) -> anyhow::Result<Self> {
        let rt = Runtime::new()?;
        let client = {
            let _guard = rt.enter();
            Client::embedded(DriverHandle::spawn(config))
        };
        Ok(Self { client, rt })
    }

    pub fn state(&self) -> SessionState {
        self.client.state()
    }

    pub fn latest(&self) -> Option<Arc<GameSnapshot>> {
        self.client.latest()
    }

    pub fn on_snapshot<F>(&mut self, f: F)
    where
        F: FnMut(&GameSnapshot) + Send + 'static,
    {
        self.client.on_snapshot(f);
    }

    pub fn on_event<F>(&mut self, f: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.client.on_event(f);
    }

    /// Apply pending deliveries; never blocks. Call once per frame.
    pub fn pump(&mut self) -> usize {
        self.client.pump()
    }

    pub fn dispatch(&self, intent: Intent) -> Dispatch {
        let _guard = self.rt.enter();
        self.client.dispatch(intent)
    }

    /// Block until the session is open or `timeout` elapses.
    pub fn wait_open(&self, timeout: Duration) -> bool {
        let Some(session) = self.client.session() else {
            return true;
        };
        self.rt
            .block_on(async { tokio::time::timeout(timeout, session.wait_for(SessionState::Open)).await })
            .unwrap_or(false)
    }

    /// Block until the next snapshot is accepted or `timeout` elapses.
    pub fn wait_snapshot(&mut self, timeout: Duration) -> Option<Arc<GameSnapshot>> {
        let client = &mut self.client;
        self.rt
            .block_on(async { tokio::time::timeout(timeout, client.next_snapshot()).await })
            .ok()
            .flatten()
    }

    pub fn close(&mut self) {
        let _guard = self.rt.enter();
        self.client.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoveDir;

    #[test]
    fn test_embedded_bridge_pumps_without_async_context() {
        let mut client = SyncClient::embedded(DriverConfig {
            base_tick: Duration::from_secs(60),
            ..DriverConfig::default()
        })
        .unwrap();
        assert!(client.wait_open(Duration::from_millis(10)));

        let first = client.wait_snapshot(Duration::from_secs(2)).unwrap();
        assert_eq!(client.dispatch(Intent::Move(MoveDir::Left)), Dispatch::Sent);
        let moved = client.wait_snapshot(Duration::from_secs(2)).unwrap();
        assert_eq!(moved.x, first.x - 1);
        assert_eq!(client.pump(), 0);
        client.close();
    }
}
