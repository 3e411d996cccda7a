//! Photo Edit Common Library
//!
//! 編集セッションの状態機械（UIフレームワーク非依存）:
//! - history: 画像1枚分のundo/redo履歴
//! - session: 複数画像とアクティブ画像
//! - viewport: ズーム・パン・比較スライダー
//! - hotspot: クリック位置 → 原画像座標
//! - workspace: セッションとビューポートの組（画像切替で表示リセット）

pub mod blob;
pub mod error;
pub mod geometry;
pub mod history;
pub mod hotspot;
pub mod operation;
pub mod session;
pub mod viewport;
pub mod workspace;

pub use blob::{mime_type_for_name, ImageBlob, ImageId};
pub use error::{EditError, Error, Result};
pub use geometry::{Point, Rect, Size};
pub use history::ImageRecord;
pub use hotspot::{map_to_natural, select_hotspot, visible_area, Hotspot, HotspotSelection};
pub use operation::EditOperation;
pub use session::{EditOutcome, EditTicket, SessionStore, Upload};
pub use viewport::{Tool, ViewportController, ViewportState, ZoomDirection};
pub use workspace::EditorWorkspace;
