//! Player agent binary for the marquee video playback orchestration
//! system.
//!
//! Connects to the coordinator, plays videos on command by spawning mpv,
//! and reports process exits back so the coordinator's play-state table
//! stays truthful. Reconnects automatically with a fixed, debounced delay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin marquee-player -- --url ws://coordinator:8080/ws
//! cargo run --bin marquee-player -- --fullscreen --media-dir /var/lib/marquee/videos
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use uuid::Uuid;

use marquee_player::{
    launcher::{LaunchMode, MpvLauncher},
    runner::{AgentConfig, run_agent},
};
use marquee_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "marquee-player")]
#[command(about = "Device-side video player agent", long_about = None)]
struct Args {
    /// Coordinator WebSocket URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Stable client identity; generated once per run when omitted
    #[arg(short = 'c', long)]
    client_id: Option<String>,

    /// Seconds to wait between reconnection attempts
    #[arg(long, default_value = "5")]
    reconnect_secs: u64,

    /// Give up after this many consecutive failed connection attempts
    /// (retries forever when unset)
    #[arg(long)]
    max_reconnect_attempts: Option<u32>,

    /// Directory holding the video files, one `<id>.mp4` per catalog entry
    #[arg(short = 'm', long, default_value = "videos")]
    media_dir: PathBuf,

    /// Media player binary to spawn
    #[arg(long, default_value = "mpv")]
    player_bin: String,

    /// Fullscreen, hardware-accelerated playback (production device mode)
    #[arg(long)]
    fullscreen: bool,
}

#[tokio::main]
async fn main() {
    setup_logger("info");

    let args = Args::parse();

    let mode = if args.fullscreen {
        LaunchMode::Fullscreen
    } else {
        LaunchMode::Windowed
    };
    let launcher = Arc::new(MpvLauncher::new(args.player_bin, args.media_dir, mode));

    let config = AgentConfig {
        url: args.url,
        client_id: args.client_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        reconnect_delay: Duration::from_secs(args.reconnect_secs),
        max_reconnect_attempts: args.max_reconnect_attempts,
    };

    if let Err(e) = run_agent(config, launcher).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}
