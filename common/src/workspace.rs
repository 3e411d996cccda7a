//! セッションとビューポートの組
//!
//! アクティブ画像（インデックスかレコードID）が変わったら表示を
//! scale 1 / translate (0,0) に戻す。セッションへの書き込みは全て
//! ここを経由させること。

use crate::blob::ImageId;
use crate::error::Result;
use crate::geometry::Size;
use crate::session::{SessionStore, Upload};
use crate::viewport::ViewportController;

#[derive(Debug, Clone, Default)]
pub struct EditorWorkspace {
    session: SessionStore,
    viewport: ViewportController,
}

impl EditorWorkspace {
    pub fn new(viewport: Size) -> Self {
        Self {
            session: SessionStore::new(),
            viewport: ViewportController::new(viewport),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub fn load_single(&mut self, upload: Upload) {
        self.update_session(|session| session.load_single(upload));
    }

    pub fn load_multiple(&mut self, uploads: Vec<Upload>) {
        self.update_session(|session| session.load_multiple(uploads));
    }

    pub fn clear(&mut self) {
        self.update_session(SessionStore::clear);
    }

    pub fn select_active(&mut self, index: usize) -> Result<()> {
        self.update_session(|session| session.select_active(index))
    }

    /// セッションを更新し、アクティブ画像が変わっていればビューポートをリセット
    pub fn update_session<R>(&mut self, f: impl FnOnce(&mut SessionStore) -> R) -> R {
        let before = self.active_key();
        let result = f(&mut self.session);
        if self.active_key() != before {
            self.viewport.on_active_image_changed();
        }
        result
    }

    fn active_key(&self) -> Option<(usize, ImageId)> {
        let index = self.session.active_index()?;
        self.session.active_record().map(|record| (index, record.id()))
    }
}
