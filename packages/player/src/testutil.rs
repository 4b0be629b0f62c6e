//! Test helpers for process supervision.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::launcher::VideoLauncher;

/// Launcher that runs a small shell script instead of a media player.
pub struct ShellLauncher {
    script: String,
}

impl ShellLauncher {
    /// A process that stays alive until killed.
    pub fn sleeping() -> Self {
        Self {
            script: "sleep 30".to_string(),
        }
    }

    /// A process that exits immediately with `code`.
    pub fn exiting(code: i32) -> Self {
        Self {
            script: format!("exit {}", code),
        }
    }
}

#[async_trait]
impl VideoLauncher for ShellLauncher {
    async fn launch(&self, _video_id: &str) -> std::io::Result<Child> {
        Command::new("sh")
            .arg("-c")
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}
