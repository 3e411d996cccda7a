//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use photo_edit::common::EditError;
use photo_edit::error::PhotoEditError;
use photo_edit::scanner;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result.unwrap_err(), PhotoEditError::FileNotFound(_)));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_inputs(&[dir.path().to_path_buf()]);
    assert!(result.unwrap().is_empty());
}

/// 読めないファイルはImageLoadになる
#[test]
fn test_load_missing_file() {
    let info = scanner::ImageInfo {
        path: PathBuf::from("/nonexistent/photo.png"),
        file_name: "photo.png".to_string(),
    };
    let err = scanner::load_uploads(&[info]).unwrap_err();
    assert!(matches!(err, PhotoEditError::ImageLoad(_)));
}

/// PhotoEditErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PhotoEditError::Config("テスト設定エラー".to_string()),
        PhotoEditError::FileNotFound("test.jpg".to_string()),
        PhotoEditError::ImageLoad("broken".to_string()),
        PhotoEditError::NoImagesFound("フォルダ".to_string()),
        PhotoEditError::HotspotOutOfBounds { x: 10, y: 10, width: 5, height: 5 },
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = format!("{}", PhotoEditError::MissingApiKey);
    assert!(display.contains("APIキー"));
    assert!(display.contains("photo-edit config"));
}

/// セッションエラーは透過的に表示される
#[test]
fn test_session_error_transparent() {
    let err: PhotoEditError = photo_edit::common::Error::Index { index: 4, len: 2 }.into();
    assert!(matches!(err, PhotoEditError::Session(_)));
    assert_eq!(format!("{}", err), "Image index 4 out of range (len 2)");
}

/// 編集エラーからの変換
#[test]
fn test_edit_error_conversion() {
    let err: PhotoEditError = EditError::Stopped("MAX_TOKENS".to_string()).into();
    assert!(matches!(err, PhotoEditError::Edit(_)));
    assert!(format!("{}", err).contains("MAX_TOKENS"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PhotoEditError = io_err.into();

    assert!(matches!(err, PhotoEditError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: PhotoEditError = json_err.into();

    assert!(matches!(err, PhotoEditError::JsonParse(_)));
}
