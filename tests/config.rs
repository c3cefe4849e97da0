use std::fs;
use std::time::Duration;

use taskmaster::config::{Config, StoreOp, DEFAULT_STORAGE_KEY};
use taskmaster::error::Error;

#[test]
fn missing_config_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.storage.key, DEFAULT_STORAGE_KEY);
    assert!(cfg.seed.enabled);
    assert!(!cfg.latency.enabled);
}

#[test]
fn partial_config_overrides_only_given_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let content = r#"
[storage]
key = "work_tasks"

[latency]
enabled = true
create_ms = 50
"#;
    fs::write(Config::path_in(dir.path()), content.trim()).expect("write config");

    let cfg = Config::load(&Config::path_in(dir.path())).expect("load");
    assert_eq!(cfg.storage.key, "work_tasks");
    assert_eq!(cfg.storage.lock_timeout_ms, 5000);
    assert!(cfg.seed.enabled);
    assert_eq!(cfg.latency.delay_for(StoreOp::Create), Duration::from_millis(50));
    assert_eq!(cfg.latency.delay_for(StoreOp::GetAll), Duration::from_millis(600));
}

#[test]
fn latency_is_zero_when_disabled() {
    let cfg = Config::default();
    for op in [
        StoreOp::GetAll,
        StoreOp::GetById,
        StoreOp::Create,
        StoreOp::Update,
        StoreOp::Delete,
    ] {
        assert_eq!(cfg.latency.delay_for(op), Duration::ZERO);
    }
}

#[test]
fn invalid_storage_key_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = Config::path_in(dir.path());
    fs::write(&path, "[storage]\nkey = \"../escape\"\n").expect("write config");

    let err = Config::load(&path).expect_err("invalid key");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn load_from_dir_defaults_on_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(Config::path_in(dir.path()), "[storage]\nlock_timeout_ms = 0\n")
        .expect("write config");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg, Config::default());

    fs::write(Config::path_in(dir.path()), "seed = 123").expect("write config");
    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg, Config::default());
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = Config::path_in(dir.path());
    let mut cfg = Config::default();
    cfg.seed.enabled = false;
    cfg.save(&path).expect("save");

    assert_eq!(Config::load(&path).expect("load"), cfg);
}
