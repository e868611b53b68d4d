mod common;

use rschedule::config::{
    Config, KEY_DEFAULT_QUEUE, KEY_POLL_INTERVAL, KEY_PRINTS_DIR, Settings,
};
use rschedule::errors::AppError;

#[test]
fn ephemeral_config_has_defaults() {
    let cfg = Config::ephemeral("/tmp/x.sqlite");
    assert_eq!(cfg.database, "/tmp/x.sqlite");
    assert_eq!(cfg.read(KEY_DEFAULT_QUEUE).as_deref(), Some("laser"));
    assert_eq!(cfg.read(KEY_POLL_INTERVAL).as_deref(), Some("1000"));
    assert!(cfg.file.is_none());
}

#[test]
fn unset_prints_dir_is_configuration_missing() {
    let mut cfg = Config::ephemeral("db");
    assert!(matches!(
        cfg.require(KEY_PRINTS_DIR),
        Err(AppError::ConfigurationMissing(ref k)) if k == KEY_PRINTS_DIR
    ));

    cfg.write(KEY_PRINTS_DIR, "/srv/prints").unwrap();
    assert_eq!(cfg.require(KEY_PRINTS_DIR).unwrap(), "/srv/prints");
}

#[test]
fn invalid_values_and_keys_are_rejected() {
    let mut cfg = Config::ephemeral("db");
    assert!(matches!(
        cfg.write(KEY_POLL_INTERVAL, "soon"),
        Err(AppError::Config(_))
    ));
    assert!(matches!(cfg.write("colour", "red"), Err(AppError::Config(_))));

    cfg.write(KEY_POLL_INTERVAL, "250").unwrap();
    assert_eq!(cfg.poll_interval_ms, 250);
}

#[test]
fn yaml_round_trip_keeps_optional_keys_out_when_unset() {
    let cfg = Config::ephemeral("db.sqlite");
    let yaml = cfg.to_yaml().unwrap();
    assert!(yaml.contains("database: db.sqlite"));
    assert!(!yaml.contains("prints_dir"));

    let back: Config = serde_yaml::from_str("database: other.sqlite\n").unwrap();
    assert_eq!(back.default_queue, "laser");
    assert_eq!(back.poll_interval_ms, 1000);
}

#[test]
fn unreadable_config_reports_the_cause() {
    let dir = common::temp_dir("cfg_errors");
    let bad = dir.join("broken.conf");
    std::fs::write(&bad, "database: [unclosed\n").unwrap();

    match Config::load_from(&bad) {
        Err(AppError::Config(msg)) => {
            assert!(msg.contains("broken.conf"));
            assert!(msg.len() > bad.display().to_string().len() + 2);
        }
        other => panic!("expected a config error, got {other:?}"),
    }

    // a directory exists but cannot be read as a file
    match Config::load_from(&dir) {
        Err(AppError::Config(msg)) => assert!(msg.contains("cfg_errors")),
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn missing_config_file_loads_defaults_bound_to_that_path() {
    let path = common::temp_dir("cfg_missing").join("absent.conf");
    let cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg.default_queue, "laser");
    assert_eq!(cfg.file.as_deref(), Some(path.as_path()));
}
