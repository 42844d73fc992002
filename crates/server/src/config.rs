use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use tracing::warn;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    pub script_dir: PathBuf,
    pub images_dir: PathBuf,
    pub keyboard_device: PathBuf,
    pub mouse_device: PathBuf,
    pub interpreter: String,
    pub replay_program: PathBuf,
    pub mouse_program: PathBuf,
    pub action_timeout_secs: u64,
    pub stop_timeout_secs: u64,
    pub max_image_bytes: u64,
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8444".into(),
            script_dir: "scripts".into(),
            images_dir: "images".into(),
            keyboard_device: "/dev/hidg0".into(),
            mouse_device: "/dev/hidg1".into(),
            interpreter: "python3".into(),
            replay_program: "ahk_to_hid_v2.py".into(),
            mouse_program: "mouse_control.py".into(),
            action_timeout_secs: 10,
            stop_timeout_secs: 5,
            max_image_bytes: catalog::library::DEFAULT_MAX_IMAGE_BYTES,
            dry_run: false,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE)
        .ok()
        .and_then(|raw| match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(values) => Some(values),
            Err(error) => {
                warn!(%error, file = SETTINGS_FILE, "ignoring unparsable settings file");
                None
            }
        })
        .unwrap_or_default();
    let env: HashMap<String, String> = std::env::vars().collect();
    resolve_settings(&file, &env)
}

/// Defaults, then `server.toml` keys, then `APP__<KEY>` (or the legacy
/// unprefixed name) from the environment.
pub(crate) fn resolve_settings(
    file: &HashMap<String, toml::Value>,
    env: &HashMap<String, String>,
) -> Settings {
    let sources = Sources { file, env };
    let mut settings = Settings::default();

    if let Some(v) = sources.get("bind_addr", "SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = sources.get("script_dir", "SCRIPT_DIR") {
        settings.script_dir = v.into();
    }
    if let Some(v) = sources.get("images_dir", "IMAGES_DIR") {
        settings.images_dir = v.into();
    }
    if let Some(v) = sources.get("keyboard_device", "KEYBOARD_DEVICE") {
        settings.keyboard_device = v.into();
    }
    if let Some(v) = sources.get("mouse_device", "MOUSE_DEVICE") {
        settings.mouse_device = v.into();
    }
    if let Some(v) = sources.get("interpreter", "PYTHON") {
        settings.interpreter = v;
    }
    if let Some(v) = sources.get("replay_program", "REPLAY_PROGRAM") {
        settings.replay_program = v.into();
    }
    if let Some(v) = sources.get("mouse_program", "MOUSE_PROGRAM") {
        settings.mouse_program = v.into();
    }
    sources.parse_into(
        &mut settings.action_timeout_secs,
        "action_timeout_secs",
        "ACTION_TIMEOUT_SECS",
    );
    sources.parse_into(&mut settings.stop_timeout_secs, "stop_timeout_secs", "STOP_TIMEOUT_SECS");
    sources.parse_into(&mut settings.max_image_bytes, "max_image_bytes", "MAX_IMAGE_BYTES");
    sources.parse_into(&mut settings.dry_run, "dry_run", "DRY_RUN");

    settings
}

struct Sources<'a> {
    file: &'a HashMap<String, toml::Value>,
    env: &'a HashMap<String, String>,
}

impl Sources<'_> {
    fn get(&self, key: &str, legacy: &str) -> Option<String> {
        let from_env = self
            .env
            .get(&format!("APP__{}", key.to_ascii_uppercase()))
            .or_else(|| self.env.get(legacy));
        if let Some(value) = from_env {
            return Some(value.clone());
        }
        match self.file.get(key)? {
            toml::Value::String(value) => Some(value.clone()),
            other => Some(other.to_string()),
        }
    }

    fn parse_into<T: FromStr>(&self, slot: &mut T, key: &str, legacy: &str) {
        let Some(raw) = self.get(key, legacy) else {
            return;
        };
        match raw.trim().parse::<T>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => warn!(key, value = %raw, "ignoring invalid setting"),
        }
    }
}

/// Creates the script and image directories if they are missing.
pub fn prepare_directories(settings: &Settings) -> anyhow::Result<()> {
    for dir in [&settings.script_dir, &settings.images_dir] {
        ensure_dir(dir)?;
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory '{}'", dir.display()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
