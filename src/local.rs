//! ローカル変換（クロップ・リサイズ）
//!
//! 外部APIを使わずにその場でデコード → 変換 → PNG再エンコードする。

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use photo_edit_common::{EditError, ImageBlob};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTransform {
    /// 原画像ピクセル単位の矩形。画像外にはみ出す部分は切り詰める
    Crop { x: u32, y: u32, width: u32, height: u32 },
    Resize { width: u32, height: u32 },
}

impl LocalTransform {
    pub fn kind(&self) -> &'static str {
        match self {
            LocalTransform::Crop { .. } => "crop",
            LocalTransform::Resize { .. } => "resize",
        }
    }
}

/// 画像をデコードせずにサイズだけ読む
pub fn image_dimensions(blob: &ImageBlob) -> Result<(u32, u32), EditError> {
    ImageReader::new(Cursor::new(blob.bytes()))
        .with_guessed_format()
        .map_err(|e| EditError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| EditError::Decode(e.to_string()))
}

pub fn apply(blob: &ImageBlob, transform: LocalTransform) -> Result<ImageBlob, EditError> {
    let image = decode(blob)?;
    let output = match transform {
        LocalTransform::Crop { x, y, width, height } => {
            let x = x.min(image.width());
            let y = y.min(image.height());
            let width = width.min(image.width() - x);
            let height = height.min(image.height() - y);
            if width == 0 || height == 0 {
                return Err(EditError::Local("クロップ範囲が空です".into()));
            }
            image.crop_imm(x, y, width, height)
        }
        LocalTransform::Resize { width, height } => {
            if width == 0 || height == 0 {
                return Err(EditError::Local("リサイズ後のサイズが0です".into()));
            }
            image.resize_exact(width, height, FilterType::Lanczos3)
        }
    };
    encode_png(&output)
}

fn decode(blob: &ImageBlob) -> Result<DynamicImage, EditError> {
    image::load_from_memory(blob.bytes()).map_err(|e| EditError::Decode(e.to_string()))
}

fn encode_png(image: &DynamicImage) -> Result<ImageBlob, EditError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| EditError::Local(e.to_string()))?;
    Ok(ImageBlob::new(buffer.into_inner(), "image/png"))
}
