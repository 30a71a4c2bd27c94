// tests/theme_store_test.rs

use kittytube::config::theme::{ThemeColor, ThemeSettings, ThemeSource, ThemeStore};
use tempfile::tempdir;

fn settings(bg: &str, fg: &str) -> ThemeSettings {
    ThemeSettings {
        bg: bg.parse::<ThemeColor>().unwrap(),
        fg: fg.parse::<ThemeColor>().unwrap(),
    }
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("kittytube_theme.json");

    ThemeStore::new(path.clone())
        .with_legacy_path(None)
        .save(&settings("#112233", "#aabbcc"))
        .unwrap();

    let (theme, source) = ThemeStore::new(path.clone()).with_legacy_path(None).load();
    assert_eq!(theme, settings("#112233", "#aabbcc"));
    assert!(matches!(source, ThemeSource::File(p) if p == path));

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["bg"], "#112233");
    assert_eq!(raw["fg"], "#aabbcc");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let store = ThemeStore::new(dir.path().join("kittytube_theme.json")).with_legacy_path(None);

    let (theme, source) = store.load();
    assert_eq!(theme, ThemeSettings::default());
    assert_eq!(theme.bg.as_str(), "#1e1e1e");
    assert_eq!(theme.fg.as_str(), "#e6e6e6");
    assert!(matches!(source, ThemeSource::Defaults));
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kittytube_theme.json");
    std::fs::write(&path, "{\"bg\": \"#112233\",").unwrap();

    let (theme, source) = ThemeStore::new(path).with_legacy_path(None).load();
    assert_eq!(theme, ThemeSettings::default());
    assert!(matches!(source, ThemeSource::Fallback(_)));
}

#[test]
fn test_invalid_color_in_file_falls_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kittytube_theme.json");
    std::fs::write(&path, r##"{"bg": "purple", "fg": "#ffffff"}"##).unwrap();

    let (theme, source) = ThemeStore::new(path).with_legacy_path(None).load();
    assert_eq!(theme, ThemeSettings::default());
    assert!(matches!(source, ThemeSource::Fallback(_)));
}

#[test]
fn test_partial_file_keeps_default_for_missing_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kittytube_theme.json");
    std::fs::write(&path, r##"{"fg": "#00ff00"}"##).unwrap();

    let (theme, _) = ThemeStore::new(path).with_legacy_path(None).load();
    assert_eq!(theme, settings("#1e1e1e", "#00ff00"));
}

#[test]
fn test_legacy_file_is_imported_once() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("old").join("kittytube_theme.json");
    std::fs::create_dir_all(legacy.parent().unwrap()).unwrap();
    std::fs::write(&legacy, r##"{"bg": "#000000", "fg": "#ffffff"}"##).unwrap();
    let path = dir.path().join("config").join("kittytube_theme.json");

    let store = ThemeStore::new(path.clone()).with_legacy_path(Some(legacy.clone()));
    let (theme, source) = store.load();
    assert_eq!(theme, settings("#000000", "#ffffff"));
    assert!(matches!(source, ThemeSource::File(_)));
    assert!(path.is_file());

    // 新位置已存在时不再覆盖
    store.save(&settings("#123456", "#654321")).unwrap();
    let (theme, _) = store.load();
    assert_eq!(theme, settings("#123456", "#654321"));
}

#[test]
fn test_save_into_unwritable_location_fails() {
    let dir = tempdir().unwrap();
    // 父路径是一个普通文件，无法创建目录
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let store = ThemeStore::new(blocker.join("kittytube_theme.json")).with_legacy_path(None);

    let err = store.save(&ThemeSettings::default()).unwrap_err();
    assert!(matches!(err, kittytube::error::AppError::ThemePersistence(_)));
}
