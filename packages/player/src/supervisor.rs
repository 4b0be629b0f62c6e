//! Supervision of the external media-player process.
//!
//! States: Idle → Playing → Idle. A monotonically increasing generation
//! counter tags every spawned process. Killing an old process and spawning
//! a new one interleave with the old process's asynchronous exit event;
//! the generation check is what keeps that race from corrupting state: an
//! exit event carrying anything but the current generation is stale and is
//! discarded silently.

use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::Child;

use crate::launcher::VideoLauncher;

/// The external player failed to start. Treated as an immediate
/// exit-equivalent for the attempted generation; the caller reports a
/// `stop` upstream so the coordinator's table is corrected.
#[derive(Debug, Error)]
#[error("failed to launch player for video '{video_id}': {source}")]
pub struct SpawnError {
    pub video_id: String,
    #[source]
    pub source: std::io::Error,
}

/// Exit event for a supervised process.
#[derive(Debug)]
pub struct ProcessExit {
    pub generation: u64,
    pub video_id: String,
    /// `None` when waiting on the child failed; logged, handled like a
    /// crash.
    pub status: Option<ExitStatus>,
}

struct ActiveProcess {
    generation: u64,
    video_id: String,
    child: Child,
}

/// Owns at most one external player process at a time.
pub struct ProcessSupervisor {
    launcher: Arc<dyn VideoLauncher>,
    generation: u64,
    current: Option<ActiveProcess>,
}

impl ProcessSupervisor {
    pub fn new(launcher: Arc<dyn VideoLauncher>) -> Self {
        Self {
            launcher,
            generation: 0,
            current: None,
        }
    }

    /// Start playback of `video_id`, superseding any current process.
    ///
    /// The old process is signalled without waiting for its exit; the
    /// generation counter increments before the new spawn, so any exit
    /// event the old process still produces is stale by construction.
    pub async fn start(&mut self, video_id: &str) -> Result<(), SpawnError> {
        if let Some(mut active) = self.current.take() {
            tracing::info!(
                "Superseding video '{}' (generation {})",
                active.video_id,
                active.generation
            );
            if let Err(e) = active.child.start_kill() {
                tracing::debug!("Kill of superseded process failed: {}", e);
            }
        }

        self.generation += 1;
        let generation = self.generation;

        let child = self
            .launcher
            .launch(video_id)
            .await
            .map_err(|source| SpawnError {
                video_id: video_id.to_string(),
                source,
            })?;

        tracing::info!("Playing video '{}' (generation {})", video_id, generation);
        self.current = Some(ActiveProcess {
            generation,
            video_id: video_id.to_string(),
            child,
        });
        Ok(())
    }

    /// Stop playback and go idle. The generation is bumped so the killed
    /// process's exit event cannot match; nothing is emitted upstream.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.current.take() {
            tracing::info!(
                "Stopping video '{}' (generation {})",
                active.video_id,
                active.generation
            );
            if let Err(e) = active.child.start_kill() {
                tracing::debug!("Kill of stopped process failed: {}", e);
            }
            self.generation += 1;
        }
    }

    /// Wait for the current process to exit. Pends forever while idle, so
    /// it can sit in a `tokio::select!` arm.
    pub async fn next_exit(&mut self) -> ProcessExit {
        match &mut self.current {
            Some(active) => {
                let status = match active.child.wait().await {
                    Ok(status) => Some(status),
                    Err(e) => {
                        tracing::warn!("Waiting on player process failed: {}", e);
                        None
                    }
                };
                ProcessExit {
                    generation: active.generation,
                    video_id: active.video_id.clone(),
                    status,
                }
            }
            None => std::future::pending().await,
        }
    }

    /// Apply an exit event. Returns the video id to report stopped
    /// upstream when the event is current; stale events return `None` and
    /// change nothing.
    pub fn handle_exit(&mut self, exit: &ProcessExit) -> Option<String> {
        match &self.current {
            Some(active) if active.generation == exit.generation => {
                match exit.status {
                    Some(status) if status.success() => {
                        tracing::info!("Video '{}' finished", exit.video_id)
                    }
                    Some(status) => tracing::warn!(
                        "Player process for '{}' exited abnormally: {}",
                        exit.video_id,
                        status
                    ),
                    None => tracing::warn!(
                        "Player process for '{}' lost without exit status",
                        exit.video_id
                    ),
                }
                self.current = None;
                Some(exit.video_id.clone())
            }
            _ => {
                tracing::debug!(
                    "Discarding stale exit event for '{}' (generation {}, current {})",
                    exit.video_id,
                    exit.generation,
                    self.generation
                );
                None
            }
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_video(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.video_id.as_str())
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}
