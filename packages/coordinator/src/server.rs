//! Server construction and execution.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    auth::AuthSessions,
    catalog::VideoEntry,
    handler::{get_videos, health_check, post_auth, post_command, websocket_handler},
    relay::RelayCoordinator,
    signal::shutdown_signal,
    state::AppState,
};

/// The coordinator server: WebSocket relay plus the thin HTTP surface.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(catalog, Some("secret".to_string()));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a server with a play-state table built from `catalog`.
    ///
    /// `auth_password` of `None` disables the HTTP auth layer.
    pub fn new(catalog: Vec<VideoEntry>, auth_password: Option<String>) -> Self {
        let state = Arc::new(AppState {
            relay: RelayCoordinator::new(&catalog),
            auth: AuthSessions::new(auth_password),
        });
        Self { state }
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g. "127.0.0.1")
    /// * `port` - The port number to bind to (e.g. 8080)
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .route("/api/videos", get(get_videos))
            .route("/api/command", post(post_command))
            .route("/api/auth", post(post_auth))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Coordinator listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Coordinator shutdown complete");

        Ok(())
    }
}
