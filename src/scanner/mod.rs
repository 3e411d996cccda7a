use crate::error::{PhotoEditError, Result};
use photo_edit_common::{mime_type_for_name, ImageBlob, Upload};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// フォルダ直下の画像を列挙（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(PhotoEditError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| is_image_extension(&ext.to_string_lossy()))
        })
        .map(|path| ImageInfo {
            file_name: file_name_of(&path),
            path,
        })
        .collect();

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 引数のファイル・フォルダを入力順に展開する
pub fn scan_inputs(inputs: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            images.extend(scan_folder(input)?);
        } else if input.is_file() {
            images.push(ImageInfo {
                path: input.clone(),
                file_name: file_name_of(input),
            });
        } else {
            return Err(PhotoEditError::FileNotFound(input.display().to_string()));
        }
    }
    Ok(images)
}

/// ファイルを読み込んでセッション投入用のアップロードにする
pub fn load_uploads(images: &[ImageInfo]) -> Result<Vec<Upload>> {
    images
        .iter()
        .map(|info| {
            let bytes = std::fs::read(&info.path).map_err(|e| {
                PhotoEditError::ImageLoad(format!("{}: {}", info.path.display(), e))
            })?;
            let blob = ImageBlob::new(bytes, mime_type_for_name(&info.file_name));
            Ok(Upload::new(info.file_name.clone(), blob))
        })
        .collect()
}
