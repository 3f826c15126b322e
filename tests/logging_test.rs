use bsky_actions::logging::init_logging;
use config::PathManager;

#[test]
fn test_init_logging_writes_under_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    PathManager::set_data_dir(dir.path().to_path_buf());

    init_logging();
    init_logging();
    tracing::info!("logging test event");

    let path = PathManager::log_file_path().unwrap();
    assert!(path.starts_with(dir.path()));
    assert!(path.exists());
    assert!(PathManager::settings_path().unwrap().parent().unwrap().is_dir());
}
