//! 編集の投入（1枚 / 全画像への一括適用）
//!
//! 1枚の編集: Idle → Processing → Idle(成功で履歴+1 / 失敗でerror設定)。
//! 失敗はそのレコードの `error` に閉じ込め、呼び出し側には返さない。
//!
//! 一括適用は画像を1枚ずつ順番に処理する。外部APIへの同時リクエストは常に1、
//! 画像間には固定の待機を挟む。1枚の失敗でループは止めない。

use crate::editor::ImageEditor;
use crate::local::{self, LocalTransform};
use photo_edit_common::{EditOperation, EditOutcome, Result, SessionStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

/// ロックは外部API呼び出しの await をまたいで保持しない
pub type SharedSession = Arc<Mutex<SessionStore>>;

pub fn shared(session: SessionStore) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// 一括適用の1枚ごとの進捗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub index: usize,
    pub outcome: BatchItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItem {
    Done(EditOutcome),
    /// 範囲外・処理中などで投入できなかった
    Skipped(String),
}

/// 一括適用の結果（画像ごとの成否）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: Vec<usize>,
    pub failed: Vec<(usize, String)>,
    pub skipped: Vec<(usize, String)>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded.len() == self.total
    }
}

pub struct Dispatcher<E> {
    editor: E,
    session: SharedSession,
    batch_delay: Duration,
}

impl<E: ImageEditor> Dispatcher<E> {
    pub fn new(editor: E, session: SharedSession) -> Self {
        Self {
            editor,
            session,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 1枚に編集を適用する。返る Err は投入前のゲート（範囲外・処理中）のみ
    pub async fn apply_edit(&self, index: usize, op: &EditOperation) -> Result<EditOutcome> {
        let ticket = self.lock().begin_edit(index)?;
        log::info!("{} [{}] 開始 ({})", op.kind(), index, ticket.id);

        let result = self.editor.edit(&ticket.source, op).await;
        if let Err(err) = &result {
            log::warn!("{} [{}] 失敗: {}", op.kind(), index, err);
        }

        let outcome = self.lock().complete_edit(&ticket, result);
        log::info!("{} [{}] 完了: {:?}", op.kind(), index, outcome);
        Ok(outcome)
    }

    /// 全画像へ順番に適用する。`on_progress` は1枚終わるごとに呼ばれる
    pub async fn apply_to_all<F>(&self, op: &EditOperation, mut on_progress: F) -> BatchReport
    where
        F: FnMut(&BatchProgress),
    {
        let total = self.lock().len();
        let mut report = BatchReport {
            total,
            ..Default::default()
        };
        log::info!("一括{}: {}枚", op.kind(), total);

        for index in 0..total {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            let item = match self.apply_edit(index, op).await {
                Ok(outcome) => {
                    match &outcome {
                        EditOutcome::Applied { .. } => report.succeeded.push(index),
                        EditOutcome::Failed { message } => report.failed.push((index, message.clone())),
                        EditOutcome::Stale => report.skipped.push((index, "stale".to_string())),
                    }
                    BatchItem::Done(outcome)
                }
                Err(err) => {
                    log::warn!("{} [{}] スキップ: {}", op.kind(), index, err);
                    report.skipped.push((index, err.to_string()));
                    BatchItem::Skipped(err.to_string())
                }
            };

            on_progress(&BatchProgress {
                completed: index + 1,
                total,
                index,
                outcome: item,
            });
        }

        log::info!(
            "一括{}完了: 成功{} / 失敗{} / スキップ{}",
            op.kind(),
            report.succeeded.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }

    /// クロップ・リサイズをその場で適用する
    pub fn apply_local(&self, index: usize, transform: LocalTransform) -> Result<EditOutcome> {
        apply_local(&self.session, index, transform)
    }
}

/// ローカル変換を1枚に適用し、API編集と同じ経路で履歴に追記する
pub fn apply_local(
    session: &SharedSession,
    index: usize,
    transform: LocalTransform,
) -> Result<EditOutcome> {
    let lock = || session.lock().unwrap_or_else(PoisonError::into_inner);
    let ticket = lock().begin_edit(index)?;
    let result = local::apply(&ticket.source, transform);
    if let Err(err) = &result {
        log::warn!("{} [{}] 失敗: {}", transform.kind(), index, err);
    }
    Ok(lock().complete_edit(&ticket, result))
}
