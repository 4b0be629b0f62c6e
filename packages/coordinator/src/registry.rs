//! Connection registry: the single player slot plus the observer set.
//!
//! Constructed once at coordinator startup and mutated only through the
//! register/unregister operations below; there is no ambient global
//! connection state.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A second player handshake arrived while one is active.
    /// First-registered-wins; the new transport must be closed.
    #[error("a player is already registered")]
    PlayerAlreadyRegistered,
}

/// Outbound channel for a connection; JSON frames are queued here and
/// drained by the connection's send task.
pub type OutboundSender = UnboundedSender<String>;

/// The registered player connection.
pub struct PlayerSlot {
    pub client_id: String,
    pub sender: OutboundSender,
    /// Unix timestamp (milliseconds) when the handshake was accepted.
    pub connected_at: i64,
}

/// A registered observer connection.
pub struct ObserverEntry {
    pub sender: OutboundSender,
    pub connected_at: i64,
}

/// Tracks who is connected and in which role.
#[derive(Default)]
pub struct ConnectionRegistry {
    player: Option<PlayerSlot>,
    observers: HashMap<String, ObserverEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the player connection. Fails if a player is already
    /// registered; the existing connection is never silently replaced.
    pub fn register_player(
        &mut self,
        client_id: String,
        sender: OutboundSender,
        connected_at: i64,
    ) -> Result<(), RegistryError> {
        if self.player.is_some() {
            return Err(RegistryError::PlayerAlreadyRegistered);
        }
        self.player = Some(PlayerSlot {
            client_id,
            sender,
            connected_at,
        });
        Ok(())
    }

    /// Register an observer. A reconnect with the same client id replaces
    /// the prior entry instead of duplicating it.
    pub fn register_observer(
        &mut self,
        client_id: String,
        sender: OutboundSender,
        connected_at: i64,
    ) {
        let entry = ObserverEntry {
            sender,
            connected_at,
        };
        if self.observers.insert(client_id.clone(), entry).is_some() {
            tracing::info!("Observer '{}' reconnected, replacing prior entry", client_id);
        }
    }

    /// Clear the player slot, but only if `sender` is the registered
    /// channel. A disconnect from a rejected duplicate must not evict the
    /// active player. Returns the removed slot so the caller can log the
    /// connection's lifetime.
    pub fn unregister_player(&mut self, sender: &OutboundSender) -> Option<PlayerSlot> {
        match &self.player {
            Some(slot) if slot.sender.same_channel(sender) => self.player.take(),
            _ => None,
        }
    }

    /// Remove an observer, but only if `sender` is the registered channel.
    /// A late disconnect from a socket that was already replaced by a
    /// reconnect must not evict its successor. Returns the removed entry.
    pub fn unregister_observer(
        &mut self,
        client_id: &str,
        sender: &OutboundSender,
    ) -> Option<ObserverEntry> {
        match self.observers.get(client_id) {
            Some(entry) if entry.sender.same_channel(sender) => self.observers.remove(client_id),
            _ => None,
        }
    }

    pub fn player(&self) -> Option<&PlayerSlot> {
        self.player.as_ref()
    }

    pub fn has_player(&self) -> bool {
        self.player.is_some()
    }

    pub fn observers(&self) -> impl Iterator<Item = (&String, &ObserverEntry)> {
        self.observers.iter()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
