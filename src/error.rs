use photo_edit_common::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoEditError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`photo-edit config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("指定位置が画像の範囲外です: ({x}, {y}) / {width}x{height}")]
    HotspotOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("編集エラー: {0}")]
    Edit(#[from] EditError),

    #[error(transparent)]
    Session(#[from] photo_edit_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PhotoEditError>;
