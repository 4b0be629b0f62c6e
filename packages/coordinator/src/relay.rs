//! Relay coordinator: consumes inbound messages, updates the play-state
//! table, and routes commands and notifications between the player and the
//! observers.
//!
//! Routing policy: commands from observers update the table optimistically
//! (before the player confirms anything) to keep observer UIs responsive.
//! The player's own reports are authoritative and correct the table when
//! the optimistic update was wrong, e.g. after a spawn failure on the
//! device.

use tokio::sync::Mutex;

use marquee_shared::protocol::{Action, ClientRole, PlayStateEntry, WireMessage};

use crate::{
    catalog::VideoEntry,
    playstate::PlayStateTable,
    registry::{ConnectionRegistry, OutboundSender, RegistryError},
};

/// The relay's mutable state. Registry and table always change together
/// under one lock; a handler call observes and commits both atomically.
struct RelayState {
    registry: ConnectionRegistry,
    table: PlayStateTable,
}

/// Owns the connection registry and the play-state table and applies the
/// routing rules between them. All mutation goes through these methods;
/// each handler call runs to completion before the next one touches state.
pub struct RelayCoordinator {
    inner: Mutex<RelayState>,
}

impl RelayCoordinator {
    pub fn new(catalog: &[VideoEntry]) -> Self {
        Self {
            inner: Mutex::new(RelayState {
                registry: ConnectionRegistry::new(),
                table: PlayStateTable::from_catalog(catalog),
            }),
        }
    }

    /// Register the player connection. On rejection the caller must close
    /// the transport; the active player is never silently replaced.
    pub async fn register_player(
        &self,
        client_id: String,
        sender: OutboundSender,
    ) -> Result<(), RegistryError> {
        let mut state = self.inner.lock().await;
        state
            .registry
            .register_player(client_id.clone(), sender, marquee_shared::time::now_millis())?;
        tracing::info!("Player '{}' connected and registered", client_id);
        Ok(())
    }

    /// Register an observer and hand it the current table snapshot.
    /// Reconnecting with the same client id replaces the prior entry.
    ///
    /// Snapshot and registration happen under the same lock, so the
    /// observer is guaranteed a notify for every change after its
    /// snapshot; nothing falls in between.
    pub async fn register_observer(&self, client_id: String, sender: OutboundSender) {
        let mut state = self.inner.lock().await;

        let msg = WireMessage::Snapshot {
            videos: state.table.snapshot(),
        };
        if sender.send(serde_json::to_string(&msg).unwrap()).is_err() {
            tracing::warn!("Failed to send snapshot to observer '{}'", client_id);
        }

        state
            .registry
            .register_observer(client_id.clone(), sender, marquee_shared::time::now_millis());
        tracing::info!(
            "Observer '{}' connected (observers: {})",
            client_id,
            state.registry.observer_count()
        );
    }

    /// Apply a playback command from either side of the link.
    ///
    /// `origin` is the role the connection registered with, not whatever
    /// the message claims. Commands naming a video outside the catalog are
    /// logged and dropped without touching any state. Table update and
    /// routing commit atomically; two concurrent commands cannot update
    /// the table in one order and notify in the other.
    pub async fn handle_command(
        &self,
        origin: ClientRole,
        sender_id: &str,
        action: Action,
        video_id: &str,
    ) {
        let mut state = self.inner.lock().await;

        if let Err(e) = state.table.set_playing(video_id, action == Action::Start) {
            tracing::warn!("Dropping command from {} '{}': {}", origin, sender_id, e);
            return;
        }

        match origin {
            ClientRole::Observer => {
                // Forward the command verbatim to the player.
                let command = WireMessage::Command {
                    action,
                    id: video_id.to_string(),
                    client_type: origin,
                };
                let command_json = serde_json::to_string(&command).unwrap();
                match state.registry.player() {
                    Some(player) => {
                        if player.sender.send(command_json).is_err() {
                            tracing::warn!(
                                "Failed to forward command to player '{}'",
                                player.client_id
                            );
                        } else {
                            tracing::info!(
                                "Forwarded [{:?} '{}'] from observer '{}' to player",
                                action,
                                video_id,
                                sender_id
                            );
                        }
                    }
                    None => {
                        tracing::warn!(
                            "No player registered, dropping command [{:?} '{}']",
                            action,
                            video_id
                        );
                    }
                }

                // Everyone except the sender learns about the optimistic
                // state change.
                Self::broadcast_notify(&state.registry, video_id, action, Some(sender_id));
            }
            ClientRole::Player => {
                // Authoritative state report from the device; all
                // observers are notified, including any that originated
                // the command being corrected.
                tracing::info!(
                    "Player reported [{:?} '{}'], table updated",
                    action,
                    video_id
                );
                Self::broadcast_notify(&state.registry, video_id, action, None);
            }
        }
    }

    /// Clean up after a transport close.
    ///
    /// On player loss the table is deliberately left untouched: it reflects
    /// the last state the player reported, and a reconnecting player may
    /// genuinely still be mid-playback. The next authoritative report
    /// resynchronizes it.
    pub async fn handle_disconnect(
        &self,
        role: ClientRole,
        client_id: &str,
        sender: &OutboundSender,
    ) {
        let mut state = self.inner.lock().await;
        let now = marquee_shared::time::now_millis();
        match role {
            ClientRole::Player => {
                if let Some(slot) = state.registry.unregister_player(sender) {
                    tracing::info!(
                        "Player '{}' disconnected after {}ms, slot cleared",
                        client_id,
                        now - slot.connected_at
                    );
                }
            }
            ClientRole::Observer => {
                if let Some(entry) = state.registry.unregister_observer(client_id, sender) {
                    tracing::info!(
                        "Observer '{}' disconnected after {}ms (observers: {})",
                        client_id,
                        now - entry.connected_at,
                        state.registry.observer_count()
                    );
                }
            }
        }
    }

    /// Current table snapshot, also served over `GET /api/videos`.
    pub async fn snapshot(&self) -> Vec<PlayStateEntry> {
        let state = self.inner.lock().await;
        state.table.snapshot()
    }

    pub async fn has_player(&self) -> bool {
        let state = self.inner.lock().await;
        state.registry.has_player()
    }

    fn broadcast_notify(
        registry: &ConnectionRegistry,
        video_id: &str,
        action: Action,
        exclude: Option<&str>,
    ) {
        let notify = WireMessage::Notify {
            id: video_id.to_string(),
            action,
        };
        let notify_json = serde_json::to_string(&notify).unwrap();
        for (id, observer) in registry.observers() {
            if exclude == Some(id.as_str()) {
                continue;
            }
            if observer.sender.send(notify_json.clone()).is_err() {
                tracing::warn!("Failed to send notify to observer '{}'", id);
            }
        }
    }
}
