use std::time::Duration;

use async_trait::async_trait;

mod dry_run;
mod hid;
mod replay;

pub use dry_run::DryRunDriver;
pub use hid::HidDevices;
pub use replay::{ReplayConfig, ReplayDriver};

/// One primitive of a scripted input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStep {
    /// Press `key`, hold it for `hold_ms`, release.
    Tap { key: &'static str, hold_ms: u64 },
    /// Hold `held`, tap `tapped` for `hold_ms`, release both.
    Chord {
        held: &'static str,
        tapped: &'static str,
        hold_ms: u64,
    },
    /// Left click at screen coordinates.
    Click { x: u32, y: u32 },
    Wait { ms: u64 },
}

impl InputStep {
    pub const fn tap(key: &'static str, hold_ms: u64) -> Self {
        InputStep::Tap { key, hold_ms }
    }

    pub const fn chord(held: &'static str, tapped: &'static str, hold_ms: u64) -> Self {
        InputStep::Chord {
            held,
            tapped,
            hold_ms,
        }
    }

    pub const fn click(x: u32, y: u32) -> Self {
        InputStep::Click { x, y }
    }

    pub const fn wait(ms: u64) -> Self {
        InputStep::Wait { ms }
    }

    /// Time the step keeps the input device busy.
    pub fn duration(&self) -> Duration {
        match *self {
            InputStep::Tap { hold_ms, .. } | InputStep::Chord { hold_ms, .. } => {
                Duration::from_millis(hold_ms)
            }
            InputStep::Click { .. } => Duration::ZERO,
            InputStep::Wait { ms } => Duration::from_millis(ms),
        }
    }
}

/// Delivers input primitives to the controlled machine.
#[async_trait]
pub trait InputDriver: Send + Sync {
    async fn send(&self, step: &InputStep) -> anyhow::Result<()>;
}

/// Plays `steps` in order, stopping at the first failure.
pub async fn play(driver: &dyn InputDriver, steps: &[InputStep]) -> anyhow::Result<()> {
    for (index, step) in steps.iter().enumerate() {
        driver
            .send(step)
            .await
            .map_err(|e| e.context(format!("step {} of {} ({step:?})", index + 1, steps.len())))?;
    }
    Ok(())
}

pub fn total_duration(steps: &[InputStep]) -> Duration {
    steps.iter().map(InputStep::duration).sum()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
