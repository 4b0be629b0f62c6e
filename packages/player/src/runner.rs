//! Agent execution: session loop with debounced reconnection.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::AgentError, launcher::VideoLauncher, reconnect::ReconnectTimer, session::run_session,
    supervisor::ProcessSupervisor,
};

/// Static configuration for the player agent.
pub struct AgentConfig {
    /// Coordinator WebSocket URL.
    pub url: String,
    /// Stable client identity, re-sent in every handshake.
    pub client_id: String,
    /// Fixed delay between a disconnect and the next connection attempt.
    pub reconnect_delay: Duration,
    /// Optional cap on consecutive failed connection attempts;
    /// `None` retries forever.
    pub max_reconnect_attempts: Option<u32>,
}

/// Run the player agent until the reconnect cap (if any) is exhausted.
///
/// The process supervisor lives across sessions: losing the coordinator
/// connection does not interrupt whatever video is currently playing.
pub async fn run_agent(
    config: AgentConfig,
    launcher: Arc<dyn VideoLauncher>,
) -> Result<(), AgentError> {
    let mut supervisor = ProcessSupervisor::new(launcher);
    let mut timer = ReconnectTimer::new(config.reconnect_delay);
    let mut consecutive_failures: u32 = 0;

    loop {
        tracing::info!("Connecting to {} as '{}'", config.url, config.client_id);

        match run_session(&config, &mut supervisor, &mut timer).await {
            Ok(()) => {
                consecutive_failures = 0;
                tracing::info!("Session ended");
            }
            Err(AgentError::Connection(e)) => {
                consecutive_failures += 1;
                tracing::warn!(
                    "Connection attempt failed ({} in a row): {}",
                    consecutive_failures,
                    e
                );
                if let Some(max) = config.max_reconnect_attempts
                    && consecutive_failures >= max
                {
                    tracing::error!("Failed to connect after {} attempts", consecutive_failures);
                    return Err(AgentError::ReconnectExhausted(consecutive_failures));
                }
            }
            Err(e) => {
                consecutive_failures = 0;
                tracing::warn!("Session lost: {}", e);
            }
        }

        // The session arms the timer on every transport event; make sure
        // an attempt is scheduled even on paths that could not.
        if !timer.is_armed() {
            timer.request();
        }
        tracing::info!("Reconnecting in {:?}", timer.delay());
        timer.wait().await;
    }
}
