//! One WebSocket session with the coordinator.
//!
//! A session runs from a successful `connect_async` until the transport
//! breaks. It is a single event loop: inbound commands drive the process
//! supervisor, and supervised-process exits flow back upstream as `stop`
//! reports so the coordinator's table stays truthful.

use futures_util::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use marquee_shared::protocol::{Action, ClientRole, WireMessage};

use crate::{
    error::AgentError, reconnect::ReconnectTimer, runner::AgentConfig,
    supervisor::ProcessSupervisor,
};

/// Run one session to completion.
///
/// Every transport-level failure requests a reconnect on `timer` before
/// returning; requests within the same disconnection episode coalesce.
pub(crate) async fn run_session(
    config: &AgentConfig,
    supervisor: &mut ProcessSupervisor,
    timer: &mut ReconnectTimer,
) -> Result<(), AgentError> {
    let (ws_stream, _response) = match connect_async(&config.url).await {
        Ok(result) => result,
        Err(e) => {
            timer.request();
            return Err(AgentError::Connection(e.to_string()));
        }
    };

    // Successful open: clear any pending reconnect, then identify
    // ourselves before anything else crosses the link.
    timer.disarm();
    tracing::info!("Connected to coordinator at {}", config.url);

    let (mut write, mut read) = ws_stream.split();

    let handshake = WireMessage::Connection {
        client_type: ClientRole::Player,
        client_id: config.client_id.clone(),
    };
    let handshake_json = serde_json::to_string(&handshake).unwrap();
    if let Err(e) = write.send(Message::Text(handshake_json.into())).await {
        timer.request();
        return Err(AgentError::Transport(format!("handshake failed: {}", e)));
    }

    loop {
        tokio::select! {
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if let Some(report) = handle_server_message(&text, supervisor).await {
                        send_upstream(&mut write, timer, &report).await?;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Coordinator closed the connection");
                    timer.request();
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    timer.request();
                    return Err(AgentError::Transport(e.to_string()));
                }
            },
            exit = supervisor.next_exit() => {
                if let Some(video_id) = supervisor.handle_exit(&exit) {
                    send_upstream(&mut write, timer, &stop_report(video_id)).await?;
                }
            }
        }
    }
}

/// Handle one frame from the coordinator. Returns a report to send
/// upstream, if any. Malformed messages are logged and dropped.
async fn handle_server_message(
    text: &str,
    supervisor: &mut ProcessSupervisor,
) -> Option<WireMessage> {
    match serde_json::from_str::<WireMessage>(text) {
        Ok(WireMessage::Command {
            action: Action::Start,
            id,
            ..
        }) => match supervisor.start(&id).await {
            Ok(()) => None,
            Err(e) => {
                // Spawn failure is an immediate exit-equivalent; correct
                // the coordinator's optimistic table entry.
                tracing::error!("{}", e);
                Some(stop_report(id))
            }
        },
        Ok(WireMessage::Command {
            action: Action::Stop,
            ..
        }) => {
            supervisor.stop();
            None
        }
        Ok(other) => {
            tracing::debug!("Ignoring message not addressed to the player: {:?}", other);
            None
        }
        Err(e) => {
            tracing::warn!("Malformed message from coordinator dropped: {}", e);
            None
        }
    }
}

fn stop_report(video_id: String) -> WireMessage {
    WireMessage::Command {
        action: Action::Stop,
        id: video_id,
        client_type: ClientRole::Player,
    }
}

async fn send_upstream<S>(
    write: &mut S,
    timer: &mut ReconnectTimer,
    msg: &WireMessage,
) -> Result<(), AgentError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = serde_json::to_string(msg).unwrap();
    if let Err(e) = write.send(Message::Text(json.into())).await {
        tracing::warn!("Failed to send report upstream: {}", e);
        timer.request();
        return Err(AgentError::Transport(e.to_string()));
    }
    Ok(())
}
