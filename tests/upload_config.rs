use std::io::Write;
use std::time::Duration;

use prong_uplink::{
    ConfigError, LogLevel, SchedulerError, UploadConfig, UploadScheduler, DEFAULT_TICK_INTERVAL,
};
use tempfile::NamedTempFile;

#[test]
fn defaults_use_one_second_tick() {
    let config = UploadConfig::default();
    assert_eq!(config.tick_interval(), DEFAULT_TICK_INTERVAL);
    assert_eq!(config.tick_interval(), Duration::from_secs(1));
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.log_rotation.max_bytes, 256 << 10);
    assert_eq!(config.log_rotation.max_files, 4);
    config.validate().unwrap();
}

#[test]
fn loads_partial_document_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"tick_interval_ms": 250, "log_level": "WARN", "log_rotation": {{"max_files": 2}}}}"#
    )
    .unwrap();

    let config = UploadConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.tick_interval(), Duration::from_millis(250));
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(config.log_rotation.max_files, 2);
    assert_eq!(config.thread_name, "prong-uplink");
}

#[test]
fn rejects_zero_tick() {
    let err = UploadConfig::from_json_str(r#"{"tick_interval_ms": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn rejects_unknown_fields() {
    let err = UploadConfig::from_json_str(r#"{"tick_ms": 10}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { path: None, .. }));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = UploadConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn rejects_thread_name_with_nul_byte() {
    let err = UploadConfig::from_json_str(r#"{"thread_name": "up\u0000link"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("NUL"));
}

#[test]
fn spawn_reports_nul_thread_name_as_error() {
    let config = UploadConfig {
        thread_name: "up\0link".to_string(),
        ..UploadConfig::default()
    };
    let err = UploadScheduler::builder()
        .config(config)
        .spawn()
        .err()
        .expect("NUL thread name must be rejected");
    assert!(matches!(err, SchedulerError::Config(ConfigError::Invalid(_))));
}
