//! Reconnect backoff
//!
//! Linear growth from a floor by a fixed step, capped at a ceiling, reset to
//! the floor after every successful open.

use std::time::Duration;

use crate::types::{RECONNECT_CEILING_MS, RECONNECT_FLOOR_MS, RECONNECT_STEP_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub floor: Duration,
    pub step: Duration,
    pub ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            floor: Duration::from_millis(RECONNECT_FLOOR_MS),
            step: Duration::from_millis(RECONNECT_STEP_MS),
            ceiling: Duration::from_millis(RECONNECT_CEILING_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    current: Duration,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        // A floor above the ceiling would make the cap meaningless.
        let policy = BackoffPolicy {
            ceiling: policy.ceiling.max(policy.floor),
            ..policy
        };
        Self {
            policy,
            current: policy.floor,
        }
    }

    /// Delay to wait before the next attempt; grows the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current + self.policy.step).min(self.policy.ceiling);
        delay
    }

    /// Delay the next failure would wait, without consuming it
    pub fn peek(&self) -> Duration {
        self.current
    }

    /// Back to the floor, after a successful open
    pub fn reset(&mut self) {
        self.current = self.policy.floor;
    }
}
