//! Logging setup shared by the coordinator and player binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the given default log level.
///
/// The default can be overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `default_log_level` - The level used when `RUST_LOG` is unset
///   (e.g. "debug", "info", "warn")
pub fn setup_logger(default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
