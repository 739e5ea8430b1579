//! Settings and document location integration tests

use connbook_core::config::{ConfigManager, DOCUMENT_FILE, Settings};
use connbook_core::document::Document;
use connbook_core::models::ConnectionRecord;
use connbook_core::tracing::TracingLevel;
use tempfile::TempDir;

#[test]
fn test_settings_drive_document_location() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().join("connbook"));

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(
        manager.document_path(&settings),
        dir.path().join("connbook").join(DOCUMENT_FILE)
    );

    let mut settings = settings;
    settings.document.path = Some("books/work.xml".into());
    settings.document.sort_on_load = true;
    settings.logging.level = TracingLevel::Debug;
    manager.save_settings(&settings).unwrap();

    let reloaded = manager.load_settings().unwrap();
    assert_eq!(reloaded, settings);
    let document_path = manager.document_path(&reloaded);
    assert_eq!(document_path, dir.path().join("connbook").join("books").join("work.xml"));

    let mut document = Document::new();
    document
        .add_connection(document.tree().root(), ConnectionRecord::new_ssh("a", "h"))
        .unwrap();
    document.save(&document_path).unwrap();
    assert_eq!(Document::load(&document_path).unwrap().registry().count(), 1);
}

#[test]
fn test_partial_settings_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
    std::fs::write(manager.settings_path(), "[logging]\nlevel = \"info\"\n").unwrap();

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings.logging.level, TracingLevel::Info);
    assert!(settings.document.check_on_load);
    assert!(!settings.document.sort_on_load);
    assert_eq!(settings.document.path, None);
}
