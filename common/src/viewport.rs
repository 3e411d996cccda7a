//! ビューポート（ズーム・パン・比較スライダー）
//!
//! 状態は scale と translate のみ。コンテナ自身に
//! `translate(tx, ty) scale(s)` が掛かっている前提で、
//! コンテンツ座標 c は画面上 `translate + c * scale` に表示される。

use crate::geometry::{Point, Size};
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 5.0;
/// ズームボタン1回分の倍率
pub const BUTTON_ZOOM_FACTOR: f32 = 1.2;
/// ホイール1ステップ分の倍率
pub const WHEEL_ZOOM_FACTOR: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// 編集ツール。クロップ・リサイズ中はビューポートを固定する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Retouch,
    Adjust,
    Filter,
    Crop,
    Resize,
    Expand,
    Upscale,
    Compose,
}

impl Tool {
    pub fn locks_viewport(&self) -> bool {
        matches!(self, Tool::Crop | Tool::Resize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub scale: f32,
    pub translate: Point,
    pub compare_enabled: bool,
    /// 原画像/編集後を分割する位置（ビューポート幅に対する%）
    pub slider_position: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Point::ZERO,
            compare_enabled: false,
            slider_position: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    state: ViewportState,
    tool: Tool,
    viewport: Size,
    pan_anchor: Option<Point>,
    slider_dragging: bool,
}

impl ViewportController {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_viewport_size(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    pub fn is_slider_dragging(&self) -> bool {
        self.slider_dragging
    }

    /// パン・ズームを受け付けるか
    pub fn interaction_enabled(&self) -> bool {
        !self.tool.locks_viewport() && !self.slider_dragging
    }

    /// 画面座標 → コンテンツ座標
    pub fn to_content(&self, screen: Point) -> Point {
        (screen - self.state.translate).scale(1.0 / self.state.scale)
    }

    /// コンテンツ座標 → 画面座標
    pub fn to_screen(&self, content: Point) -> Point {
        self.state.translate + content.scale(self.state.scale)
    }

    /// pivot の下にあった点を動かさずに拡大/縮小する
    pub fn zoom_at_point(&mut self, direction: ZoomDirection, factor: f32, pivot: Point) -> bool {
        if !self.interaction_enabled() {
            return false;
        }
        let old_scale = self.state.scale;
        let target = match direction {
            ZoomDirection::In => old_scale * factor,
            ZoomDirection::Out => old_scale / factor,
        };
        let new_scale = target.clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == old_scale {
            return false;
        }

        let ratio = new_scale / old_scale;
        self.state.translate = pivot - (pivot - self.state.translate).scale(ratio);
        self.state.scale = new_scale;
        true
    }

    /// ズームボタン: ビューポート中心を基準に 1.2 倍
    pub fn zoom_button(&mut self, direction: ZoomDirection) -> bool {
        self.zoom_at_point(direction, BUTTON_ZOOM_FACTOR, self.viewport.center())
    }

    /// ホイール: ポインタ位置を基準に 1.1 倍。上方向(負)で拡大
    pub fn wheel(&mut self, delta_y: f32, pointer: Point) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let direction = if delta_y < 0.0 {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        };
        self.zoom_at_point(direction, WHEEL_ZOOM_FACTOR, pointer)
    }

    /// 制限なしの平行移動
    pub fn pan(&mut self, delta: Point) -> bool {
        if !self.interaction_enabled() {
            return false;
        }
        self.state.translate = self.state.translate + delta;
        true
    }

    pub fn begin_pan(&mut self, pointer: Point) -> bool {
        if !self.interaction_enabled() {
            return false;
        }
        self.pan_anchor = Some(pointer);
        true
    }

    pub fn pan_to(&mut self, pointer: Point) -> bool {
        let Some(anchor) = self.pan_anchor else {
            return false;
        };
        if !self.pan(pointer - anchor) {
            return false;
        }
        self.pan_anchor = Some(pointer);
        true
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    pub fn reset(&mut self) {
        self.state.scale = 1.0;
        self.state.translate = Point::ZERO;
        self.pan_anchor = None;
        log::debug!("viewport reset");
    }

    /// アクティブ画像が切り替わったら表示をリセット
    pub fn on_active_image_changed(&mut self) {
        self.reset();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.tool = tool;
        if tool.locks_viewport() {
            self.reset();
        }
    }

    pub fn set_compare_enabled(&mut self, enabled: bool) {
        self.state.compare_enabled = enabled;
        if !enabled {
            self.slider_dragging = false;
        }
    }

    pub fn toggle_compare(&mut self) {
        let enabled = !self.state.compare_enabled;
        self.set_compare_enabled(enabled);
    }

    pub fn set_slider_position(&mut self, percent: f32) {
        self.state.slider_position = percent.clamp(0.0, 100.0);
    }

    /// スライダードラッグ開始。パンより優先される
    pub fn begin_slider_drag(&mut self) -> bool {
        if !self.state.compare_enabled {
            return false;
        }
        self.slider_dragging = true;
        self.pan_anchor = None;
        true
    }

    /// ビューポート左端からの x を%に変換してスライダーを動かす
    pub fn slider_drag_to(&mut self, pointer_x: f32) -> bool {
        if !self.slider_dragging || self.viewport.width <= 0.0 {
            return false;
        }
        self.set_slider_position(pointer_x / self.viewport.width * 100.0);
        true
    }

    pub fn end_slider_drag(&mut self) {
        self.slider_dragging = false;
    }
}
