use super::{prepare_directories, resolve_settings, Settings};

use std::{collections::HashMap, path::PathBuf};

fn file(raw: &str) -> HashMap<String, toml::Value> {
    toml::from_str(raw).expect("toml")
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn defaults_apply_without_any_source() {
    let settings = resolve_settings(&HashMap::new(), &HashMap::new());
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.bind_addr, "0.0.0.0:8444");
    assert_eq!(settings.stop_timeout_secs, 5);
    assert!(!settings.dry_run);
}

#[test]
fn file_values_override_defaults() {
    let settings = resolve_settings(
        &file(
            r#"
            bind_addr = "127.0.0.1:9000"
            script_dir = "/srv/macros"
            stop_timeout_secs = 2
            dry_run = true
            "#,
        ),
        &HashMap::new(),
    );
    assert_eq!(settings.bind_addr, "127.0.0.1:9000");
    assert_eq!(settings.script_dir, PathBuf::from("/srv/macros"));
    assert_eq!(settings.stop_timeout_secs, 2);
    assert!(settings.dry_run);
}

#[test]
fn prefixed_env_beats_legacy_env_beats_file() {
    let file = file(r#"bind_addr = "127.0.0.1:9000""#);

    let legacy = resolve_settings(&file, &env(&[("SERVER_BIND", "127.0.0.1:9001")]));
    assert_eq!(legacy.bind_addr, "127.0.0.1:9001");

    let prefixed = resolve_settings(
        &file,
        &env(&[
            ("SERVER_BIND", "127.0.0.1:9001"),
            ("APP__BIND_ADDR", "127.0.0.1:9002"),
        ]),
    );
    assert_eq!(prefixed.bind_addr, "127.0.0.1:9002");
}

#[test]
fn invalid_numbers_keep_the_previous_value() {
    let settings = resolve_settings(
        &file("action_timeout_secs = 3"),
        &env(&[("APP__ACTION_TIMEOUT_SECS", "soon"), ("APP__DRY_RUN", "yes")]),
    );
    assert_eq!(settings.action_timeout_secs, 10);
    assert!(!settings.dry_run);
}

#[test]
fn prepare_directories_creates_missing_dirs() {
    let root = tempfile::tempdir().expect("tempdir");
    let settings = Settings {
        script_dir: root.path().join("nested").join("scripts"),
        images_dir: root.path().join("images"),
        ..Settings::default()
    };
    prepare_directories(&settings).expect("prepare");
    assert!(settings.script_dir.is_dir());
    assert!(settings.images_dir.is_dir());

    prepare_directories(&settings).expect("idempotent");
}
