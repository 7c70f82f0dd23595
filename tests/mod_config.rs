use arrayquery::config::{CONFIG_FILE_NAME, ENV_CONFIG, ENV_DATE_FORMATS, ENV_LOG_LEVEL};
use arrayquery::{EngineConfig, QueryError, logger};
use std::collections::HashMap;

fn env(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect();
    move |k: &str| map.get(k).cloned()
}

#[test]
fn defaults_without_any_source() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = EngineConfig::from_file(&dir.path().join("absent.toml"));
    assert!(matches!(cfg, Err(QueryError::Io(_))));
    let d = EngineConfig::default();
    assert_eq!(d.log_level, "info");
    assert!(d.date_formats.iter().any(|f| f == "iso8601"));
}

#[test]
fn explicit_file_then_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "date_formats = [\"%d.%m.%Y\"]\nlog_level = \"debug\"\n").unwrap();

    let cfg = EngineConfig::load(Some(&path), env(&[])).unwrap();
    assert_eq!(cfg.date_formats, vec!["%d.%m.%Y".to_string()]);
    assert_eq!(cfg.log_level, "debug");

    let cfg = EngineConfig::load(Some(&path), env(&[(ENV_LOG_LEVEL, "trace".into())])).unwrap();
    assert_eq!(cfg.log_level, "trace");
    assert_eq!(cfg.date_formats, vec!["%d.%m.%Y".to_string()]);
}

#[test]
fn config_path_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "log_level = \"warn\"\n").unwrap();
    let lookup = env(&[(ENV_CONFIG, path.display().to_string()), (ENV_DATE_FORMATS, "%Y;;".into())]);
    let paths = EngineConfig::search_paths(None, &lookup);
    assert_eq!(paths[0], path);
    let cfg = EngineConfig::load(None, &lookup).unwrap();
    assert_eq!(cfg.log_level, "warn");
    assert_eq!(cfg.date_formats, vec!["%Y".to_string()]);
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "log_level = [").unwrap();
    assert!(matches!(EngineConfig::load(Some(&path), env(&[])), Err(QueryError::Config(_))));
}

#[test]
fn file_logging_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");
    let lookup = env(&[
        (logger::ENV_LOG_DIR, logs.display().to_string()),
        (ENV_LOG_LEVEL, "debug".into()),
        (logger::ENV_DEV6, "true".into()),
    ]);
    logger::configure_from_env(lookup).unwrap();
    log::info!("hello from the test");
    assert!(logs.join("arrayquery.log").exists());
    assert!(logs.join("dev6.log").exists());
    // a second install is ignored
    logger::configure_logging("warn").unwrap();
}
