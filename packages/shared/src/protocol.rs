//! Wire protocol for the coordinator link.
//!
//! All traffic is JSON text frames over a persistent WebSocket connection.
//! The message set is a closed tagged union: anything that does not
//! deserialize into [`WireMessage`] is malformed by definition and must be
//! logged and dropped at the boundary, never coerced.

use serde::{Deserialize, Serialize};

/// Role a connection declares in its handshake.
///
/// At most one `player` connection is accepted by the coordinator at any
/// instant; observers are unbounded and keyed by their client id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    Player,
    Observer,
}

impl std::fmt::Display for ClientRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientRole::Player => write!(f, "player"),
            ClientRole::Observer => write!(f, "observer"),
        }
    }
}

/// Playback action carried by commands and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    Stop,
}

/// One row of the coordinator's play-state table.
///
/// The id set is fixed at startup from the video catalog; only `is_playing`
/// ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayStateEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_playing: bool,
}

/// Every message that may cross the WebSocket link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireMessage {
    /// Handshake sent by a client immediately after the socket opens.
    #[serde(rename_all = "camelCase")]
    Connection {
        client_type: ClientRole,
        client_id: String,
    },
    /// Playback command. Observers originate these; the player also emits
    /// them as authoritative state reports (e.g. "this video just stopped").
    #[serde(rename_all = "camelCase")]
    Command {
        action: Action,
        id: String,
        client_type: ClientRole,
    },
    /// One-way, unacknowledged state-change broadcast, coordinator to
    /// observers only.
    Notify { id: String, action: Action },
    /// Full play-state table, handed to a newly joined observer.
    Snapshot { videos: Vec<PlayStateEntry> },
}
