//! エラー型定義

use thiserror::Error;

/// セッション操作のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 履歴の端でのundo/redo（UI側でボタンを無効化して回復する）
    #[error("Nothing to {action}")]
    NoOp { action: &'static str },

    #[error("Image index {index} out of range (len {len})")]
    Index { index: usize, len: usize },

    /// 処理中の画像に新しい編集は投入できない
    #[error("Image {index} is already processing")]
    Busy { index: usize },
}

/// 外部の生成画像APIの失敗。常に人間が読めるメッセージを持つ
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Request was blocked. Reason: {0}")]
    Blocked(String),

    #[error("The AI model did not return an image{0}")]
    NoImage(String),

    #[error("Image generation stopped unexpectedly. Reason: {0}")]
    Stopped(String),

    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid image data: {0}")]
    Decode(String),

    #[error("Local transform failed: {0}")]
    Local(String),
}

impl EditError {
    /// リトライで回復し得る失敗か（429・5xx・通信エラー）
    pub fn is_transient(&self) -> bool {
        match self {
            EditError::Http { status, .. } => *status == 429 || *status >= 500,
            EditError::Transport(_) => true,
            _ => false,
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_noop() {
        let error = Error::NoOp { action: "undo" };
        assert_eq!(format!("{}", error), "Nothing to undo");
    }

    #[test]
    fn test_error_display_index() {
        let error = Error::Index { index: 5, len: 3 };
        let display = format!("{}", error);
        assert!(display.contains("5"));
        assert!(display.contains("len 3"));
    }

    #[test]
    fn test_edit_error_display_blocked() {
        let error = EditError::Blocked("SAFETY".to_string());
        assert_eq!(format!("{}", error), "Request was blocked. Reason: SAFETY");
    }

    #[test]
    fn test_edit_error_transient() {
        assert!(EditError::Http { status: 429, message: String::new() }.is_transient());
        assert!(EditError::Http { status: 503, message: String::new() }.is_transient());
        assert!(EditError::Transport("reset".to_string()).is_transient());
        assert!(!EditError::Http { status: 400, message: String::new() }.is_transient());
        assert!(!EditError::Blocked("SAFETY".to_string()).is_transient());
        assert!(!EditError::NoImage(String::new()).is_transient());
    }

    #[test]
    fn test_error_debug() {
        let error = Error::Busy { index: 2 };
        let debug = format!("{:?}", error);
        assert!(debug.contains("Busy"));
        assert!(debug.contains("2"));
    }
}
