//! 画像1枚分の線形undo/redo履歴
//!
//! - history[0] は常にアップロードした原画像
//! - 0 <= history_index < history.len()
//! - カーソルより後ろがある状態で追記すると、redo側の分岐は捨てられる
//!
//! 全ての操作は新しいレコードを返す。呼び出し側はセッション内のレコードを
//! 丸ごと差し替える（`SessionStore::replace_record`）。

use crate::blob::{ImageBlob, ImageId};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    id: ImageId,
    name: String,
    history: Vec<ImageBlob>,
    history_index: usize,
    is_processing: bool,
    error: Option<String>,
}

impl ImageRecord {
    /// アップロード直後のレコードを作成
    pub fn new(blob: ImageBlob, name: impl Into<String>) -> Self {
        Self {
            id: ImageId::next(),
            name: name.into(),
            history: vec![blob],
            history_index: 0,
            is_processing: false,
            error: None,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn history(&self) -> &[ImageBlob] {
        &self.history
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 現在表示中のバージョン
    pub fn current_blob(&self) -> &ImageBlob {
        &self.history[self.history_index]
    }

    /// 原画像（比較スライダーの左側）
    pub fn original_blob(&self) -> &ImageBlob {
        &self.history[0]
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    /// 新しいバージョンを追記。カーソルより後ろの版は破棄する
    pub fn append_version(&self, blob: ImageBlob) -> Self {
        let mut history = self.history[..=self.history_index].to_vec();
        let discarded = self.history.len() - history.len();
        history.push(blob);
        if discarded > 0 {
            log::debug!("{}: redo分岐を破棄 ({}件)", self.id, discarded);
        }
        Self {
            history_index: history.len() - 1,
            history,
            ..self.clone()
        }
    }

    pub fn undo(&self) -> Result<Self> {
        if !self.can_undo() {
            return Err(Error::NoOp { action: "undo" });
        }
        Ok(Self {
            history_index: self.history_index - 1,
            ..self.clone()
        })
    }

    pub fn redo(&self) -> Result<Self> {
        if !self.can_redo() {
            return Err(Error::NoOp { action: "redo" });
        }
        Ok(Self {
            history_index: self.history_index + 1,
            ..self.clone()
        })
    }

    /// 原画像に戻す。履歴自体は残るのでredoで戻れる
    pub fn reset_to_original(&self) -> Self {
        Self {
            history_index: 0,
            ..self.clone()
        }
    }

    /// Processing状態へ遷移（前回のエラーはクリア）
    pub fn start_processing(&self) -> Self {
        Self {
            is_processing: true,
            error: None,
            ..self.clone()
        }
    }

    /// 成功: 新バージョンを追記してIdleへ
    pub fn finish_with(&self, blob: ImageBlob) -> Self {
        Self {
            is_processing: false,
            error: None,
            ..self.append_version(blob)
        }
    }

    /// 失敗: 履歴はそのまま、エラーを記録してIdleへ
    pub fn fail_with(&self, message: impl Into<String>) -> Self {
        Self {
            is_processing: false,
            error: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn dismiss_error(&self) -> Self {
        Self {
            error: None,
            ..self.clone()
        }
    }
}
