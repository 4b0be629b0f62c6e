//! Launching the external media-player process.
//!
//! The trait seam exists so the supervisor can be tested without a real
//! video player installed on the build machine.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};

#[cfg(test)]
use mockall::automock;

/// How the external player is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Windowed playback, for development machines.
    Windowed,
    /// Fullscreen, hardware-accelerated output for the production device.
    Fullscreen,
}

/// Spawns the external player process for a video id.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VideoLauncher: Send + Sync {
    async fn launch(&self, video_id: &str) -> std::io::Result<Child>;
}

/// Launches `mpv` on a file derived from the video id.
pub struct MpvLauncher {
    program: String,
    media_dir: PathBuf,
    mode: LaunchMode,
}

impl MpvLauncher {
    pub fn new(program: String, media_dir: PathBuf, mode: LaunchMode) -> Self {
        Self {
            program,
            media_dir,
            mode,
        }
    }

    /// Build the spawn command for a video. The child is killed if its
    /// handle is dropped, so a superseded process can never outlive its
    /// supervisor entry.
    fn build_command(&self, video_id: &str) -> Command {
        let path = self.media_dir.join(format!("{}.mp4", video_id));
        let mut command = Command::new(&self.program);
        if self.mode == LaunchMode::Fullscreen {
            command.args(["--fs", "--vo=drm"]);
        }
        command
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl VideoLauncher for MpvLauncher {
    async fn launch(&self, video_id: &str) -> std::io::Result<Child> {
        // The id becomes part of a file path; keep it to a safe alphabet
        // so it cannot escape the media directory.
        if !is_safe_video_id(video_id) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid video id '{}'", video_id),
            ));
        }
        tracing::info!(
            "Spawning {} for video '{}' ({:?})",
            self.program,
            video_id,
            self.mode
        );
        self.build_command(video_id).spawn()
    }
}

fn is_safe_video_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && !video_id.starts_with('.')
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
