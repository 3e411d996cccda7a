//! 複数画像の編集セッション
//!
//! `images` はセッション唯一の共有可変リソース。書き込みは全て
//! `replace_record` を経由し、他のインデックスのレコードには触れない。
//! マルチスレッドのホストでは `Arc<Mutex<SessionStore>>` で包み、
//! ロックを外部API呼び出しの await をまたいで保持しないこと。

use crate::blob::{ImageBlob, ImageId};
use crate::error::{EditError, Error, Result};
use crate::history::ImageRecord;

/// アップロードされたファイル1件
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub blob: ImageBlob,
}

impl Upload {
    pub fn new(name: impl Into<String>, blob: ImageBlob) -> Self {
        Self {
            name: name.into(),
            blob,
        }
    }
}

/// 編集投入時に捕捉した対象（インデックス・ID・元画像）
///
/// 結果は「現在アクティブな画像」ではなく、投入時のインデックスに書き戻す。
#[derive(Debug, Clone)]
pub struct EditTicket {
    pub index: usize,
    pub id: ImageId,
    pub source: ImageBlob,
}

/// 編集結果の反映状況
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// 新バージョンを追記した
    Applied { history_len: usize },
    /// 失敗をレコードのerrorに記録した
    Failed { message: String },
    /// 投入後にセッションが差し替えられたため破棄した
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    images: Vec<ImageRecord>,
    active_index: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1枚だけ読み込み、既存の画像は全て置き換える
    pub fn load_single(&mut self, upload: Upload) {
        self.load_multiple(vec![upload]);
    }

    /// 入力順にレコードを作成し、既存の画像は全て置き換える
    pub fn load_multiple(&mut self, uploads: Vec<Upload>) {
        self.images = uploads
            .into_iter()
            .map(|upload| ImageRecord::new(upload.blob, upload.name))
            .collect();
        self.active_index = if self.images.is_empty() { None } else { Some(0) };
        log::info!("セッション読み込み: {}枚", self.images.len());
    }

    /// 「新規アップロード」: 空のセッションに戻す
    pub fn clear(&mut self) {
        self.images.clear();
        self.active_index = None;
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active_record(&self) -> Option<&ImageRecord> {
        self.active_index.and_then(|i| self.images.get(i))
    }

    pub fn record(&self, index: usize) -> Result<&ImageRecord> {
        self.images.get(index).ok_or(Error::Index {
            index,
            len: self.images.len(),
        })
    }

    pub fn select_active(&mut self, index: usize) -> Result<()> {
        self.record(index)?;
        self.active_index = Some(index);
        Ok(())
    }

    /// 唯一の書き込みプリミティブ。images[index] だけを差し替える
    pub fn replace_record(&mut self, index: usize, record: ImageRecord) -> Result<()> {
        let len = self.images.len();
        let slot = self.images.get_mut(index).ok_or(Error::Index { index, len })?;
        *slot = record;
        Ok(())
    }

    pub fn can_undo(&self, index: usize) -> bool {
        self.images.get(index).is_some_and(|r| r.can_undo())
    }

    pub fn can_redo(&self, index: usize) -> bool {
        self.images.get(index).is_some_and(|r| r.can_redo())
    }

    /// どれか1枚でも処理中か（UIの isLoading ゲート）
    pub fn has_processing(&self) -> bool {
        self.images.iter().any(|r| r.is_processing())
    }

    pub fn undo(&mut self, index: usize) -> Result<()> {
        let next = self.idle_record(index)?.undo()?;
        log::debug!("undo: {} -> {}", next.id(), next.history_index());
        self.replace_record(index, next)
    }

    pub fn redo(&mut self, index: usize) -> Result<()> {
        let next = self.idle_record(index)?.redo()?;
        log::debug!("redo: {} -> {}", next.id(), next.history_index());
        self.replace_record(index, next)
    }

    pub fn reset_to_original(&mut self, index: usize) -> Result<()> {
        let next = self.idle_record(index)?.reset_to_original();
        self.replace_record(index, next)
    }

    pub fn dismiss_error(&mut self, index: usize) -> Result<()> {
        let next = self.record(index)?.dismiss_error();
        self.replace_record(index, next)
    }

    /// ローカル変換などの同期的な結果を新バージョンとして追記
    pub fn append_version(&mut self, index: usize, blob: ImageBlob) -> Result<()> {
        let next = self.idle_record(index)?.append_version(blob);
        self.replace_record(index, next)
    }

    /// Idle → Processing。処理中なら `Busy`
    pub fn begin_edit(&mut self, index: usize) -> Result<EditTicket> {
        let record = self.idle_record(index)?;
        let ticket = EditTicket {
            index,
            id: record.id(),
            source: record.current_blob().clone(),
        };
        let next = record.start_processing();
        self.replace_record(index, next)?;
        Ok(ticket)
    }

    /// Processing → Idle。投入時のレコードが既に無ければ結果を捨てる
    pub fn complete_edit(
        &mut self,
        ticket: &EditTicket,
        result: std::result::Result<ImageBlob, EditError>,
    ) -> EditOutcome {
        let slot = match self.images.get_mut(ticket.index) {
            Some(r) if r.id() == ticket.id => r,
            _ => {
                log::warn!("{}: セッションが差し替えられたため結果を破棄", ticket.id);
                return EditOutcome::Stale;
            }
        };

        let (next, outcome) = match result {
            Ok(blob) => {
                let next = slot.finish_with(blob);
                let history_len = next.history().len();
                (next, EditOutcome::Applied { history_len })
            }
            Err(err) => {
                let message = err.to_string();
                (slot.fail_with(message.clone()), EditOutcome::Failed { message })
            }
        };
        *slot = next;
        outcome
    }

    fn idle_record(&self, index: usize) -> Result<&ImageRecord> {
        let record = self.record(index)?;
        if record.is_processing() {
            return Err(Error::Busy { index });
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, tag: u8) -> Upload {
        Upload::new(name, ImageBlob::new(vec![tag], "image/png"))
    }

    fn loaded(n: u8) -> SessionStore {
        let mut session = SessionStore::new();
        session.load_multiple((0..n).map(|i| upload(&format!("f{i}.png"), i)).collect());
        session
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = SessionStore::new();
        assert!(session.is_empty());
        assert!(session.active_index().is_none());
        assert!(session.active_record().is_none());
    }

    #[test]
    fn test_load_multiple() {
        let session = loaded(3);
        assert_eq!(session.len(), 3);
        assert_eq!(session.active_index(), Some(0));

        let ids: std::collections::HashSet<_> = session.images().iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), 3);
        for (i, record) in session.images().iter().enumerate() {
            assert_eq!(record.history().len(), 1);
            assert_eq!(record.name(), format!("f{i}.png"));
        }
    }

    #[test]
    fn test_load_single_replaces_everything() {
        let mut session = loaded(3);
        session.select_active(2).unwrap();
        session.load_single(upload("new.png", 9));
        assert_eq!(session.len(), 1);
        assert_eq!(session.active_index(), Some(0));
        assert_eq!(session.active_record().unwrap().name(), "new.png");
    }

    #[test]
    fn test_load_multiple_empty() {
        let mut session = loaded(2);
        session.load_multiple(Vec::new());
        assert!(session.is_empty());
        assert!(session.active_index().is_none());
    }

    #[test]
    fn test_select_active_out_of_range() {
        let mut session = loaded(2);
        let err = session.select_active(2).unwrap_err();
        assert_eq!(err, Error::Index { index: 2, len: 2 });
        assert_eq!(session.active_index(), Some(0));
    }

    #[test]
    fn test_replace_record_touches_only_target() {
        let mut session = loaded(3);
        let before: Vec<_> = session.images().to_vec();
        let next = session.record(1).unwrap().append_version(ImageBlob::new(vec![7], "image/png"));
        session.replace_record(1, next).unwrap();

        assert_eq!(session.images()[0], before[0]);
        assert_eq!(session.images()[2], before[2]);
        assert_eq!(session.images()[1].history().len(), 2);
        assert!(session.can_undo(1));
        assert!(!session.can_undo(0));
    }

    #[test]
    fn test_undo_redo_through_session() {
        let mut session = loaded(1);
        assert_eq!(session.undo(0).unwrap_err(), Error::NoOp { action: "undo" });

        session.append_version(0, ImageBlob::new(vec![5], "image/png")).unwrap();
        session.undo(0).unwrap();
        assert!(session.can_redo(0));
        session.redo(0).unwrap();
        assert_eq!(session.redo(0).unwrap_err(), Error::NoOp { action: "redo" });

        session.reset_to_original(0).unwrap();
        assert_eq!(session.record(0).unwrap().history_index(), 0);
        assert!(!session.can_undo(9));
    }

    #[test]
    fn test_begin_edit_marks_processing() {
        let mut session = loaded(2);
        let ticket = session.begin_edit(1).unwrap();
        assert_eq!(ticket.index, 1);
        assert!(session.record(1).unwrap().is_processing());
        assert!(session.has_processing());

        assert_eq!(session.begin_edit(1).unwrap_err(), Error::Busy { index: 1 });
        assert_eq!(session.undo(1).unwrap_err(), Error::Busy { index: 1 });
    }

    #[test]
    fn test_complete_edit_success_and_failure() {
        let mut session = loaded(2);
        let ticket = session.begin_edit(0).unwrap();
        let outcome = session.complete_edit(&ticket, Ok(ImageBlob::new(vec![8], "image/png")));
        assert_eq!(outcome, EditOutcome::Applied { history_len: 2 });
        assert!(!session.has_processing());

        let ticket = session.begin_edit(1).unwrap();
        let outcome = session.complete_edit(&ticket, Err(EditError::Blocked("SAFETY".into())));
        assert!(matches!(outcome, EditOutcome::Failed { .. }));
        let record = session.record(1).unwrap();
        assert!(!record.is_processing());
        assert_eq!(record.history().len(), 1);
        assert!(record.error().unwrap().contains("SAFETY"));

        session.dismiss_error(1).unwrap();
        assert!(session.record(1).unwrap().error().is_none());
    }

    /// 投入後にアクティブ画像を切り替えても、結果は投入時の画像に入る
    #[test]
    fn test_complete_edit_lands_on_captured_index() {
        let mut session = loaded(3);
        let ticket = session.begin_edit(0).unwrap();
        session.select_active(2).unwrap();
        session.complete_edit(&ticket, Ok(ImageBlob::new(vec![8], "image/png")));
        assert_eq!(session.record(0).unwrap().history().len(), 2);
        assert_eq!(session.record(2).unwrap().history().len(), 1);
    }

    #[test]
    fn test_complete_edit_after_reload_is_stale() {
        let mut session = loaded(2);
        let ticket = session.begin_edit(0).unwrap();
        session.load_multiple(vec![upload("other.png", 4)]);
        let outcome = session.complete_edit(&ticket, Ok(ImageBlob::new(vec![8], "image/png")));
        assert_eq!(outcome, EditOutcome::Stale);
        assert_eq!(session.record(0).unwrap().history().len(), 1);
    }
}
