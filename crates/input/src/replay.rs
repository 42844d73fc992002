use std::{
    io::Write,
    path::PathBuf,
    process::Stdio,
    time::Duration,
};

use anyhow::{bail, Context};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{InputDriver, InputStep};

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub interpreter: String,
    pub replay_program: PathBuf,
    pub mouse_program: PathBuf,
    pub action_timeout: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            replay_program: "ahk_to_hid_v2.py".into(),
            mouse_program: "mouse_control.py".into(),
            action_timeout: Duration::from_secs(10),
        }
    }
}

/// Delivers keys by handing a one-off AHK snippet to the HID replay program,
/// and clicks through the mouse helper.
#[derive(Debug, Clone)]
pub struct ReplayDriver {
    config: ReplayConfig,
}

impl ReplayDriver {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    async fn replay_snippet(&self, snippet: &str) -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("input-")
            .suffix(".ahk")
            .tempfile()
            .context("failed to create snippet file")?;
        file.write_all(snippet.as_bytes())
            .context("failed to write snippet file")?;
        file.flush()?;

        let mut command = Command::new(&self.config.interpreter);
        command.arg(&self.config.replay_program).arg(file.path());
        self.run(command, "key replay").await
    }

    async fn click(&self, x: u32, y: u32) -> anyhow::Result<()> {
        let mut command = Command::new(&self.config.interpreter);
        command
            .arg(&self.config.mouse_program)
            .arg("click")
            .arg(x.to_string())
            .arg(y.to_string());
        self.run(command, "mouse click").await
    }

    async fn run(&self, mut command: Command, what: &str) -> anyhow::Result<()> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let output = tokio::time::timeout(self.config.action_timeout, command.output())
            .await
            .with_context(|| {
                format!(
                    "{what} timed out after {:?}",
                    self.config.action_timeout
                )
            })?
            .with_context(|| format!("failed to launch {what} via {}", self.config.interpreter))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let reason = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            bail!("{what} exited with {}: {reason}", output.status);
        }
        Ok(())
    }
}

#[async_trait]
impl InputDriver for ReplayDriver {
    async fn send(&self, step: &InputStep) -> anyhow::Result<()> {
        debug!(?step, "replaying input");
        match *step {
            InputStep::Tap { key, hold_ms } => {
                self.replay_snippet(&tap_snippet(key, hold_ms)).await
            }
            InputStep::Chord {
                held,
                tapped,
                hold_ms,
            } => {
                self.replay_snippet(&chord_snippet(held, tapped, hold_ms))
                    .await
            }
            InputStep::Click { x, y } => self.click(x, y).await,
            InputStep::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }
        }
    }
}

pub(crate) fn tap_snippet(key: &str, hold_ms: u64) -> String {
    format!("Send, {{{key} Down}}\nSleep, {hold_ms}\nSend, {{{key} Up}}\n")
}

pub(crate) fn chord_snippet(held: &str, tapped: &str, hold_ms: u64) -> String {
    format!(
        "Send, {{{held} Down}}\nSleep, 10\nSend, {{{tapped} Down}}\nSleep, {hold_ms}\n\
         Send, {{{tapped} Up}}\nSleep, 10\nSend, {{{held} Up}}\n"
    )
}

#[cfg(test)]
#[path = "tests/replay_tests.rs"]
mod tests;
