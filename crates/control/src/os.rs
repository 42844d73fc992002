use std::{
    io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use anyhow::{bail, Context};
use async_trait::async_trait;
use input::HidDevices;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::macros::{MacroProcess, MacroSupervisor};

/// Runs scripts through the HID replay program and releases inputs by
/// writing neutral reports to the gadget devices.
#[derive(Debug, Clone)]
pub struct OsMacroSupervisor {
    interpreter: String,
    replay_program: PathBuf,
    hid: HidDevices,
}

impl OsMacroSupervisor {
    pub fn new(
        interpreter: impl Into<String>,
        replay_program: impl Into<PathBuf>,
        hid: HidDevices,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            replay_program: replay_program.into(),
            hid,
        }
    }
}

#[async_trait]
impl MacroSupervisor for OsMacroSupervisor {
    async fn spawn(&self, script_path: &Path) -> anyhow::Result<Box<dyn MacroProcess>> {
        let child = Command::new(&self.interpreter)
            .arg(&self.replay_program)
            .arg(script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "failed to spawn {} {}",
                    self.interpreter,
                    self.replay_program.display()
                )
            })?;
        let pid = child.id();
        debug!(?pid, script = %script_path.display(), "spawned replay process");
        Ok(Box::new(OsMacroProcess { child, pid }))
    }

    async fn release_inputs(&self) -> anyhow::Result<()> {
        self.hid
            .release_all()
            .await
            .context("failed to write neutral hid reports")
    }
}

pub struct OsMacroProcess {
    child: Child,
    pid: Option<u32>,
}

impl OsMacroProcess {
    fn signal(&self, signal: Signal) -> anyhow::Result<()> {
        let Some(pid) = self.pid else {
            bail!("process has already been reaped");
        };
        send_signal(pid, signal)
    }
}

#[async_trait]
impl MacroProcess for OsMacroProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn suspend(&mut self) -> anyhow::Result<()> {
        self.signal(Signal::Stop)
    }

    fn resume(&mut self) -> anyhow::Result<()> {
        self.signal(Signal::Cont)
    }

    fn terminate(&mut self) -> anyhow::Result<()> {
        self.signal(Signal::Term)
    }

    fn kill(&mut self) -> anyhow::Result<()> {
        self.child.start_kill().context("failed to kill replay process")
    }

    async fn wait_timeout(&mut self, timeout: Duration) -> anyhow::Result<bool> {
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status.context("failed to wait for replay process")?;
                debug!(pid = ?self.pid, %status, "replay process exited");
                self.pid = None;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    fn has_exited(&mut self) -> anyhow::Result<bool> {
        let status = self
            .child
            .try_wait()
            .context("failed to poll replay process")?;
        if status.is_some() {
            self.pid = None;
        }
        Ok(status.is_some())
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Stop,
    Cont,
    Term,
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: Signal) -> anyhow::Result<()> {
    let signo = match signal {
        Signal::Stop => libc::SIGSTOP,
        Signal::Cont => libc::SIGCONT,
        Signal::Term => libc::SIGTERM,
    };
    // SAFETY: kill(2) takes plain integers and touches no memory we own.
    if unsafe { libc::kill(pid as i32, signo) } != 0 {
        return Err(io::Error::last_os_error())
            .with_context(|| format!("failed to send {signal:?} to pid {pid}"));
    }
    Ok(())
}

#[cfg(not(unix))]
fn send_signal(pid: u32, signal: Signal) -> anyhow::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
        .with_context(|| format!("cannot send {signal:?} to pid {pid} on this platform"))
}

#[cfg(all(test, unix))]
#[path = "tests/os_tests.rs"]
mod tests;
