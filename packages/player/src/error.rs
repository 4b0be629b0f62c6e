//! Error types for the player agent.

use thiserror::Error;

/// Agent-level errors. None of these corrupt playback state; connection
/// and transport failures feed the reconnection supervisor.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The coordinator could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// An established session broke mid-flight.
    #[error("transport error: {0}")]
    Transport(String),

    /// The configured reconnect-attempt cap was exhausted.
    #[error("gave up reconnecting after {0} failed attempts")]
    ReconnectExhausted(u32),
}
