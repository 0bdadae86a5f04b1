use hwreport::core::config::Config;
use hwreport::core::document::PageSize;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.default_duration(), Duration::from_secs(60));
    assert_eq!(config.sample_interval(), Duration::from_millis(1000));
    assert!(config.output_dir.is_none());
    assert_eq!(config.page_size, PageSize::A4);
}

#[test]
fn test_config_load_nonexistent_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("missing.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hwreport").join("config.json");

    let mut config = Config::default();
    config.set("default_duration_secs", "15").unwrap();
    config.set("page_size", "letter").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.default_duration_secs, 15);
}

#[test]
fn test_config_corrupt_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    fs::write(&path, b"{ not json").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    fs::write(&path, b"").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_config_reset() {
    let mut config = Config::default();
    config.set("sample_interval_ms", "250").unwrap();
    config.set("logo_url", "https://example.com/logo.png").unwrap();
    config.reset_to_defaults();
    assert_eq!(config, Config::default());
}
