use std::{path::Path, sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use catalog::ScriptLookup;
use shared::{
    domain::{MacroProcessHandle, MacroStatus},
    error::{ApiError, ErrorCode},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RELEASE_TIMEOUT: Duration = Duration::from_secs(2);
const KILL_REAP_TIMEOUT: Duration = Duration::from_secs(1);

/// Launches macro processes and undoes their input side effects.
#[async_trait]
pub trait MacroSupervisor: Send + Sync {
    async fn spawn(&self, script_path: &Path) -> anyhow::Result<Box<dyn MacroProcess>>;

    /// Returns every key and button to the released state.
    async fn release_inputs(&self) -> anyhow::Result<()>;
}

/// A running replay process, controlled with OS-level signals.
#[async_trait]
pub trait MacroProcess: Send + Sync {
    fn pid(&self) -> Option<u32>;
    fn suspend(&mut self) -> anyhow::Result<()>;
    fn resume(&mut self) -> anyhow::Result<()>;
    fn terminate(&mut self) -> anyhow::Result<()>;
    fn kill(&mut self) -> anyhow::Result<()>;
    /// `true` once the process has exited, `false` if `timeout` elapsed first.
    async fn wait_timeout(&mut self, timeout: Duration) -> anyhow::Result<bool>;
    fn has_exited(&mut self) -> anyhow::Result<bool>;
}

#[derive(Debug, Error)]
pub enum MacroError {
    #[error("script not found: {0}")]
    UnknownScript(String),
    #[error("macro {script} is already {status}; stop it first")]
    AlreadyRunning { script: String, status: MacroStatus },
    #[error("no macro currently running")]
    NotRunning,
    #[error("no macro currently paused")]
    NotPaused,
    #[error("macro {script} did not exit within {timeout:?} and was killed")]
    ForcedTermination { script: String, timeout: Duration },
    #[error("failed to start macro {script}: {source:#}")]
    Launch {
        script: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to {action} macro: {source:#}")]
    Signal {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
    /// The transition happened but a key or button may still be held.
    #[error("macro {action} completed but held inputs were not released: {source:#}")]
    Release {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl From<MacroError> for ApiError {
    fn from(value: MacroError) -> Self {
        let code = match value {
            MacroError::UnknownScript(_) => ErrorCode::UnknownScript,
            MacroError::AlreadyRunning { .. } => ErrorCode::AlreadyRunning,
            MacroError::NotRunning => ErrorCode::NotRunning,
            MacroError::NotPaused => ErrorCode::NotPaused,
            MacroError::ForcedTermination { .. } => ErrorCode::ForcedTermination,
            MacroError::Launch { .. }
            | MacroError::Signal { .. }
            | MacroError::Release { .. } => ErrorCode::Internal,
        };
        ApiError::new(code, value.to_string())
    }
}

#[derive(Default)]
struct Slot {
    handle: MacroProcessHandle,
    process: Option<Box<dyn MacroProcess>>,
}

impl Slot {
    /// Notices a process that finished on its own.
    fn refresh(&mut self) {
        if !self.handle.is_active() {
            return;
        }
        let Some(process) = self.process.as_mut() else {
            return;
        };
        match process.has_exited() {
            Ok(true) => {
                info!(script = ?self.handle.current_script, "macro exited on its own");
                self.process = None;
                self.handle.status = MacroStatus::Stopped;
                self.handle.pid = None;
            }
            Ok(false) => {}
            Err(error) => warn!(%error, "could not poll macro process"),
        }
    }
}

/// Owns the single macro slot and its state machine:
/// `idle -> running <-> paused -> stopped -> idle`.
pub struct MacroProcessManager {
    scripts: Arc<dyn ScriptLookup>,
    supervisor: Arc<dyn MacroSupervisor>,
    stop_timeout: Duration,
    release_timeout: Duration,
    slot: Mutex<Slot>,
}

impl MacroProcessManager {
    pub fn new(scripts: Arc<dyn ScriptLookup>, supervisor: Arc<dyn MacroSupervisor>) -> Self {
        Self {
            scripts,
            supervisor,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            release_timeout: DEFAULT_RELEASE_TIMEOUT,
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    pub fn with_release_timeout(mut self, release_timeout: Duration) -> Self {
        self.release_timeout = release_timeout;
        self
    }

    pub async fn status(&self) -> MacroProcessHandle {
        let mut slot = self.slot.lock().await;
        slot.refresh();
        slot.handle.clone()
    }

    pub async fn start(&self, script_name: &str) -> Result<MacroProcessHandle, MacroError> {
        let mut slot = self.slot.lock().await;
        slot.refresh();
        if slot.handle.is_active() {
            return Err(MacroError::AlreadyRunning {
                script: slot.handle.current_script.clone().unwrap_or_default(),
                status: slot.handle.status,
            });
        }

        let script_path = self
            .scripts
            .locate(script_name)
            .ok_or_else(|| MacroError::UnknownScript(script_name.to_string()))?;
        let process = self
            .supervisor
            .spawn(&script_path)
            .await
            .map_err(|source| MacroError::Launch {
                script: script_name.to_string(),
                source,
            })?;

        slot.handle = MacroProcessHandle {
            status: MacroStatus::Running,
            current_script: Some(script_name.to_string()),
            pid: process.pid(),
        };
        slot.process = Some(process);
        info!(script = script_name, pid = ?slot.handle.pid, "macro started");
        Ok(slot.handle.clone())
    }

    pub async fn pause(&self) -> Result<MacroProcessHandle, MacroError> {
        let mut slot = self.slot.lock().await;
        slot.refresh();
        if slot.handle.status != MacroStatus::Running {
            return Err(MacroError::NotRunning);
        }
        let process = slot.process.as_mut().ok_or(MacroError::NotRunning)?;
        process
            .suspend()
            .map_err(|source| MacroError::Signal {
                action: "pause",
                source,
            })?;
        slot.handle.status = MacroStatus::Paused;
        info!(script = ?slot.handle.current_script, "macro paused");
        self.release_inputs()
            .await
            .map_err(|source| MacroError::Release {
                action: "pause",
                source,
            })?;
        Ok(slot.handle.clone())
    }

    pub async fn resume(&self) -> Result<MacroProcessHandle, MacroError> {
        let mut slot = self.slot.lock().await;
        slot.refresh();
        if slot.handle.status != MacroStatus::Paused {
            return Err(MacroError::NotPaused);
        }
        let process = slot.process.as_mut().ok_or(MacroError::NotPaused)?;
        process
            .resume()
            .map_err(|source| MacroError::Signal {
                action: "resume",
                source,
            })?;
        slot.handle.status = MacroStatus::Running;
        info!(script = ?slot.handle.current_script, "macro resumed");
        Ok(slot.handle.clone())
    }

    /// Terminates the macro and waits for it, escalating to a kill after the
    /// stop timeout. Stopping an idle or stopped slot is a no-op success. The
    /// slot is idle afterwards even when `ForcedTermination` or `Release` is
    /// returned; a failed release takes precedence over a forced kill.
    pub async fn stop(&self) -> Result<MacroProcessHandle, MacroError> {
        let mut slot = self.slot.lock().await;
        slot.refresh();
        if !slot.handle.is_active() {
            slot.process = None;
            slot.handle = MacroProcessHandle::idle();
            return Ok(slot.handle.clone());
        }

        let script = slot.handle.current_script.clone().unwrap_or_default();
        let was_paused = slot.handle.status == MacroStatus::Paused;
        let mut forced = false;
        if let Some(mut process) = slot.process.take() {
            if was_paused {
                if let Err(error) = process.resume() {
                    warn!(%error, "could not continue paused macro before terminating");
                }
            }
            if let Err(error) = process.terminate() {
                warn!(%error, "could not signal macro to terminate");
            }
            let exited = process
                .wait_timeout(self.stop_timeout)
                .await
                .unwrap_or_else(|error| {
                    warn!(%error, "waiting for macro exit failed");
                    false
                });
            if !exited {
                warn!(
                    script = %script,
                    timeout = ?self.stop_timeout,
                    "macro ignored terminate; killing"
                );
                forced = true;
                if let Err(error) = process.kill() {
                    warn!(%error, "could not kill macro");
                }
                if !matches!(process.wait_timeout(KILL_REAP_TIMEOUT).await, Ok(true)) {
                    warn!(script = %script, "killed macro has not been reaped yet");
                }
            }
        }

        let released = self.release_inputs().await;
        slot.handle = MacroProcessHandle::idle();
        info!(script = %script, forced, "macro stopped");

        released.map_err(|source| MacroError::Release {
            action: "stop",
            source,
        })?;
        if forced {
            return Err(MacroError::ForcedTermination {
                script,
                timeout: self.stop_timeout,
            });
        }
        Ok(slot.handle.clone())
    }

    async fn release_inputs(&self) -> anyhow::Result<()> {
        let release = self.supervisor.release_inputs();
        let result = match tokio::time::timeout(self.release_timeout, release).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "input release did not finish within {:?}",
                self.release_timeout
            )),
        };
        if let Err(error) = &result {
            warn!(error = %format!("{error:#}"), "could not release held inputs");
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/macros_tests.rs"]
mod tests;
