//! 生成画像APIとの境界
//!
//! コアは `ImageEditor` の最終結果だけを見る。リトライやバックオフは
//! 実装側（`GeminiEditor`）の責務。

mod gemini;
pub mod retry;

pub use gemini::GeminiEditor;
pub use retry::RetryPolicy;

use photo_edit_common::{EditError, EditOperation, ImageBlob};

#[allow(async_fn_in_trait)]
pub trait ImageEditor {
    /// 元画像に操作を適用した新しい画像を返す
    async fn edit(&self, source: &ImageBlob, op: &EditOperation) -> Result<ImageBlob, EditError>;
}
