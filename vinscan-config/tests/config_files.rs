use std::fs;

use tempfile::TempDir;
use vinscan_config::{ConfigError, ConfigLoader, ConfigSource, SourceKind, loader};

#[test]
fn explicit_toml_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scanner.toml");
    fs::write(
        &path,
        r#"
            [retry]
            max_attempts = 4
            backoff_base_ms = 250

            [source]
            kind = "dir"
            frame_dir = "frames"
            poll_interval_ms = 50
        "#,
    )
    .unwrap();

    let load = ConfigLoader::new()
        .with_path(&path)
        .skip_env_file()
        .load()
        .unwrap();

    assert_eq!(load.source, ConfigSource::File(path));
    assert!(!load.env_file_loaded);
    assert_eq!(load.config.retry.max_attempts, 4);
    assert_eq!(load.config.retry.backoff_base_ms, 250);
    assert_eq!(load.config.source.kind, SourceKind::Dir);
    assert_eq!(load.config.source.poll_interval_ms, 50);
}

#[test]
fn json_extension_is_parsed_as_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scanner.json");
    fs::write(&path, r#"{"pipeline": {"cooldown_ms": 500}}"#).unwrap();

    let config = loader::load_from_file(&path).unwrap();
    assert_eq!(config.pipeline.cooldown_ms, 500);
}

#[test]
fn invalid_toml_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scanner.toml");
    fs::write(&path, "retry = [").unwrap();

    match loader::load_from_file(&path) {
        Err(ConfigError::Parse { origin, .. }) => {
            assert!(origin.ends_with("scanner.toml"))
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::new()
        .with_path(dir.path().join("absent.toml"))
        .skip_env_file()
        .load();
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}
