//! Shared application state.

use crate::{auth::AuthSessions, relay::RelayCoordinator};

/// State handed to every axum handler.
pub struct AppState {
    /// The relay core: connection registry plus play-state table.
    pub relay: RelayCoordinator,
    /// Session-token store for the HTTP surface.
    pub auth: AuthSessions,
}
