//! WebSocket and HTTP handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use marquee_shared::protocol::{Action, ClientRole, PlayStateEntry, WireMessage};

use super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one WebSocket connection from handshake to cleanup.
///
/// The first frame must be a `connection` handshake; everything before
/// registration succeeds stays invisible to the relay. A rejected duplicate
/// player is closed by returning early, which drops the socket.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let (role, client_id) = match read_handshake(&mut receiver).await {
        Some(handshake) => handshake,
        None => return,
    };

    // Channel this connection's outbound frames are queued on.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    match role {
        ClientRole::Player => {
            if state
                .relay
                .register_player(client_id.clone(), tx.clone())
                .await
                .is_err()
            {
                tracing::warn!(
                    "Rejected duplicate player connection from '{}'",
                    client_id
                );
                return;
            }
        }
        ClientRole::Observer => {
            state.relay.register_observer(client_id.clone(), tx.clone()).await;
        }
    }

    // Drain the outbound queue into the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Feed inbound frames to the relay.
    let recv_state = state.clone();
    let recv_client_id = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    dispatch_message(&recv_state, role, &recv_client_id, &text).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Client '{}' requested close", recv_client_id);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("WebSocket error from '{}': {}", recv_client_id, e);
                    break;
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.relay.handle_disconnect(role, &client_id, &tx).await;
}

/// Wait for the connection handshake. Anything else is a protocol
/// violation and closes the transport.
async fn read_handshake(
    receiver: &mut (impl StreamExt<Item = Result<Message, axum::Error>> + Unpin),
) -> Option<(ClientRole, String)> {
    let text = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => break text,
            // Control frames may legitimately precede the handshake.
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(_)) | None => {
                tracing::warn!("Connection closed before handshake");
                return None;
            }
            Some(Err(e)) => {
                tracing::warn!("WebSocket error before handshake: {}", e);
                return None;
            }
        }
    };

    match serde_json::from_str::<WireMessage>(&text) {
        Ok(WireMessage::Connection {
            client_type,
            client_id,
        }) => Some((client_type, client_id)),
        Ok(other) => {
            tracing::warn!("Expected handshake, got {:?}; closing connection", other);
            None
        }
        Err(e) => {
            tracing::warn!("Malformed handshake dropped, closing connection: {}", e);
            None
        }
    }
}

/// Parse and route one inbound frame. Malformed or out-of-place messages
/// are logged and dropped; they never alter state.
async fn dispatch_message(state: &AppState, role: ClientRole, client_id: &str, text: &str) {
    match serde_json::from_str::<WireMessage>(text) {
        Ok(WireMessage::Command { action, id, .. }) => {
            // The registered role is the origin, regardless of what the
            // message's clientType field claims.
            state.relay.handle_command(role, client_id, action, &id).await;
        }
        Ok(WireMessage::Connection { .. }) => {
            tracing::debug!("Ignoring repeated handshake from '{}'", client_id);
        }
        Ok(other) => {
            tracing::warn!("Unexpected message from '{}' dropped: {:?}", client_id, other);
        }
        Err(e) => {
            tracing::warn!("Malformed message from '{}' dropped: {}", client_id, e);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub action: Action,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /api/videos`: snapshot of the play-state table.
pub async fn get_videos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PlayStateEntry>>, StatusCode> {
    if !state.auth.verify(&headers).await {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(state.relay.snapshot().await))
}

/// `POST /api/command`: semantically an observer-originated command.
pub async fn post_command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CommandRequest>,
) -> Result<StatusCode, StatusCode> {
    if !state.auth.verify(&headers).await {
        return Err(StatusCode::UNAUTHORIZED);
    }
    state
        .relay
        .handle_command(ClientRole::Observer, "http-api", req.action, &req.id)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth`: exchange the password for a session token.
pub async fn post_auth(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, StatusCode> {
    match state.auth.issue(&req.password).await {
        Some(token) => Ok(Json(AuthResponse { token })),
        None => {
            tracing::warn!("Rejected auth attempt with wrong password");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
