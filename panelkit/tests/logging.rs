//! Tests for the file logger.

use panelkit::LoggingError;
use panelkit::logging::init_file_logger;

#[test]
fn test_file_logger_installs_once() {
    let path = std::env::temp_dir().join(format!("panelkit-{}.log", std::process::id()));
    init_file_logger(&path, log::LevelFilter::Debug).unwrap();
    log::debug!("hello from the test");

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("panel logging initialized"));

    let second = init_file_logger(&path, log::LevelFilter::Info);
    assert!(matches!(second, Err(LoggingError::AlreadyInstalled(_))));
    let _ = std::fs::remove_file(&path);
}
