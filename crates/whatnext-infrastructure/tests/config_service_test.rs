use tempfile::TempDir;
use whatnext_core::config::AppConfig;
use whatnext_infrastructure::ConfigService;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let service = ConfigService::with_path(dir.path().join("config.toml"));

    let config = service.load().unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn partial_file_is_merged_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        [chat]
        debounce_ms = 250

        [nearby]
        limit = 5
        "#,
    )
    .unwrap();

    let config = ConfigService::with_path(&path).load().unwrap();
    assert_eq!(config.chat.debounce_ms, 250);
    assert_eq!(config.chat.advisory_ms, 2000);
    assert_eq!(config.nearby.limit, 5);
    assert_eq!(config.nearby.sort_by, "review_count");
}

#[test]
fn malformed_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[chat\nuser_id = ").unwrap();

    let err = ConfigService::with_path(&path).load().unwrap_err();
    assert!(err.is_config());
}

#[test]
fn save_creates_directories_and_refreshes_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("whatnext").join("config.toml");
    let service = ConfigService::with_path(&path);

    let before = service.get_config();
    assert_eq!(before.cards.cap_rank, 5);

    let mut updated = AppConfig::default();
    updated.cards.cap_rank = 3;
    service.save(&updated).unwrap();

    assert!(path.exists());
    assert_eq!(service.get_config().cards.cap_rank, 3);
}

#[test]
fn cache_survives_file_changes_until_invalidated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[cards]\ncap_rank = 4\n").unwrap();
    let service = ConfigService::with_path(&path);

    assert_eq!(service.get_config().cards.cap_rank, 4);

    std::fs::write(&path, "[cards]\ncap_rank = 2\n").unwrap();
    assert_eq!(service.get_config().cards.cap_rank, 4);

    service.invalidate_cache();
    assert_eq!(service.get_config().cards.cap_rank, 2);
}
