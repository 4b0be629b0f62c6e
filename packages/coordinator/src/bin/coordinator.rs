//! Coordinator binary for the marquee video playback orchestration system.
//!
//! Relays playback commands from observers to the single player device and
//! broadcasts the player's state reports back to all observers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin marquee-coordinator
//! cargo run --bin marquee-coordinator -- --host 0.0.0.0 --port 8080 --catalog data/videos.json
//! ```

use std::path::PathBuf;

use clap::Parser;

use marquee_coordinator::{Server, catalog::load_catalog};
use marquee_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "marquee-coordinator")]
#[command(about = "Relay coordinator for remote video playback", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Path to the video catalog JSON file
    #[arg(short = 'c', long, default_value = "data/videos.json")]
    catalog: PathBuf,

    /// Password required by POST /api/auth; HTTP endpoints are open when unset
    #[arg(long)]
    auth_password: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logger("info");

    let args = Args::parse();

    let catalog = match load_catalog(&args.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Cannot start without a video catalog: {}", e);
            std::process::exit(1);
        }
    };

    let server = Server::new(catalog, args.auth_password);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
