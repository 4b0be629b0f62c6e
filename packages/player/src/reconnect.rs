//! Debounced reconnect scheduling.
//!
//! A disconnection episode can surface several transport events in quick
//! succession (read error, then close). Each one requests a reconnect, but
//! only the first request per episode arms the timer; the rest coalesce
//! into a no-op, so exactly one attempt is scheduled.

use std::time::Duration;

/// Tracks whether a reconnect attempt is already scheduled.
#[derive(Debug)]
pub struct ReconnectTimer {
    delay: Duration,
    armed: bool,
}

impl ReconnectTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            armed: false,
        }
    }

    /// Request a reconnect. Returns `true` if this request armed the
    /// timer, `false` if one was already pending (coalesced).
    pub fn request(&mut self) -> bool {
        if self.armed {
            tracing::debug!("Reconnect already scheduled, coalescing");
            return false;
        }
        self.armed = true;
        true
    }

    /// Clear any pending reconnect; called after a successful open.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep out the reconnect delay and disarm.
    pub async fn wait(&mut self) {
        tokio::time::sleep(self.delay).await;
        self.armed = false;
    }
}
