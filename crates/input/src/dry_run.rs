use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::{InputDriver, InputStep};

/// Logs and records input instead of delivering it. Used when no HID gadget
/// is attached and as the driver in tests.
#[derive(Debug, Clone, Default)]
pub struct DryRunDriver {
    played: Arc<Mutex<Vec<InputStep>>>,
    real_waits: bool,
    fail_on: Option<&'static str>,
}

impl DryRunDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep through `Wait` steps so timing matches a real run.
    pub fn with_real_waits(mut self) -> Self {
        self.real_waits = true;
        self
    }

    /// Fail any tap or chord involving `key`.
    pub fn failing_on(mut self, key: &'static str) -> Self {
        self.fail_on = Some(key);
        self
    }

    pub async fn played(&self) -> Vec<InputStep> {
        self.played.lock().await.clone()
    }
}

#[async_trait]
impl InputDriver for DryRunDriver {
    async fn send(&self, step: &InputStep) -> anyhow::Result<()> {
        if let Some(bad) = self.fail_on {
            let hit = match *step {
                InputStep::Tap { key, .. } => key == bad,
                InputStep::Chord { held, tapped, .. } => held == bad || tapped == bad,
                _ => false,
            };
            if hit {
                anyhow::bail!("dry-run driver refused key {bad}");
            }
        }

        info!(?step, "dry-run input");
        self.played.lock().await.push(*step);
        if let InputStep::Wait { ms } = *step {
            if self.real_waits {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
        Ok(())
    }
}
