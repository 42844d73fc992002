use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::bail;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const KEYBOARD_REPORT_LEN: usize = 8;
const MOUSE_REPORT_LEN: usize = 4;

/// USB gadget endpoints the replay tools write reports to.
#[derive(Debug, Clone)]
pub struct HidDevices {
    pub keyboard: PathBuf,
    pub mouse: PathBuf,
}

impl Default for HidDevices {
    fn default() -> Self {
        Self {
            keyboard: "/dev/hidg0".into(),
            mouse: "/dev/hidg1".into(),
        }
    }
}

impl HidDevices {
    pub fn keyboard_present(&self) -> bool {
        self.keyboard.exists()
    }

    pub fn mouse_present(&self) -> bool {
        self.mouse.exists()
    }

    /// Writes an all-zero report to each device: no keys, no buttons.
    /// Devices that do not exist are skipped. Both devices are always
    /// attempted; the error names every device that could not be released.
    pub async fn release_all(&self) -> anyhow::Result<()> {
        let mut failures = Vec::new();
        for (device, len) in [
            (&self.keyboard, KEYBOARD_REPORT_LEN),
            (&self.mouse, MOUSE_REPORT_LEN),
        ] {
            if let Err(error) = write_neutral(device, len).await {
                warn!(device = %device.display(), %error, "could not write neutral report");
                failures.push(format!("{}: {error}", device.display()));
            }
        }
        if !failures.is_empty() {
            bail!("failed to release {}", failures.join("; "));
        }
        Ok(())
    }
}

/// Opens without blocking, so a gadget nobody is reading from fails fast
/// with `ENXIO`/`EAGAIN` instead of stalling the caller.
async fn write_neutral(device: &Path, len: usize) -> io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    #[cfg(unix)]
    options.custom_flags(libc::O_NONBLOCK);
    let mut file = match options.open(device).await {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(device = %device.display(), "hid device absent; nothing to release");
            return Ok(());
        }
        Err(error) => return Err(error),
    };
    file.write_all(&vec![0u8; len]).await?;
    file.flush().await?;
    Ok(())
}
