//! 「ダウンロード」: 各画像の現在バージョンと manifest.json を書き出す

use crate::error::Result;
use photo_edit_common::{ImageRecord, SessionStore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub exported_at: String,
    pub images: Vec<ExportEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub id: String,
    pub name: String,
    pub output: String,
    pub history_len: usize,
    pub history_index: usize,
    pub sha256: String,
    pub error: Option<String>,
}

/// `photo.jpg` → `photo-edited.png`（拡張子は現在バージョンの形式に合わせる）
pub fn output_file_name(record: &ImageRecord) -> String {
    let stem = Path::new(record.name())
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{}-edited.{}", stem, record.current_blob().extension())
}

pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn export_session(session: &SessionStore, output_dir: &Path) -> Result<ExportManifest> {
    std::fs::create_dir_all(output_dir)?;

    let mut images = Vec::with_capacity(session.len());
    for record in session.images() {
        let file_name = unique_name(&output_file_name(record), &images);
        let path = output_dir.join(&file_name);
        std::fs::write(&path, record.current_blob().bytes())?;
        log::debug!("書き出し: {}", path.display());

        images.push(ExportEntry {
            id: record.id().to_string(),
            name: record.name().to_string(),
            output: file_name,
            history_len: record.history().len(),
            history_index: record.history_index(),
            sha256: digest(record.current_blob().bytes()),
            error: record.error().map(str::to_string),
        });
    }

    let manifest = ExportManifest {
        exported_at: chrono::Local::now().to_rfc3339(),
        images,
    };
    let content = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(output_dir.join(MANIFEST_FILE_NAME), content)?;
    Ok(manifest)
}

/// 同名ファイルが続く場合は連番を付ける
fn unique_name(candidate: &str, written: &[ExportEntry]) -> String {
    let taken = |name: &str| written.iter().any(|e| e.output == name);
    if !taken(candidate) {
        return candidate.to_string();
    }
    let path = PathBuf::from(candidate);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
    (2..)
        .map(|n| format!("{}-{}.{}", stem, n, ext))
        .find(|name| !taken(name))
        .unwrap_or_else(|| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_edit_common::{ImageBlob, Upload};
    use tempfile::tempdir;

    #[test]
    fn test_output_file_name() {
        let record = ImageRecord::new(ImageBlob::new(vec![1], "image/jpeg"), "photo.jpg");
        assert_eq!(output_file_name(&record), "photo-edited.jpg");
        let record = record.append_version(ImageBlob::new(vec![2], "image/png"));
        assert_eq!(output_file_name(&record), "photo-edited.png");
    }

    #[test]
    fn test_digest() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_export_session_writes_current_versions() {
        let dir = tempdir().unwrap();
        let mut session = SessionStore::new();
        session.load_multiple(vec![
            Upload::new("a.png", ImageBlob::new(vec![1], "image/png")),
            Upload::new("a.png", ImageBlob::new(vec![2], "image/png")),
        ]);
        session.append_version(0, ImageBlob::new(vec![9], "image/png")).unwrap();

        let manifest = export_session(&session, dir.path()).unwrap();
        assert_eq!(manifest.images.len(), 2);
        assert_eq!(manifest.images[0].output, "a-edited.png");
        assert_eq!(manifest.images[1].output, "a-edited-2.png");
        assert_eq!(manifest.images[0].history_len, 2);

        assert_eq!(std::fs::read(dir.path().join("a-edited.png")).unwrap(), vec![9]);
        assert_eq!(std::fs::read(dir.path().join("a-edited-2.png")).unwrap(), vec![2]);
        assert!(dir.path().join(MANIFEST_FILE_NAME).exists());
    }
}
