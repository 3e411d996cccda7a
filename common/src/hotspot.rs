//! クリック位置 → 原画像ピクセル座標の変換
//!
//! 画像要素は object-fit: contain で描画されるため、縦横どちらかに余白が入る。
//! ビューポートのズーム・パンと画像自身の余白は独立した倍率なので、
//! API用（原画像ピクセル）と表示用（変形前コンテナ座標）の2つを求める。

use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// 原画像上の1ピクセル。局所編集・合成の位置指定に使う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: u32,
    pub y: u32,
}

impl Hotspot {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// 描画矩形内で実際に画像が見えている領域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleArea {
    pub size: Size,
    pub offset: Point,
}

/// クリック1回分の変換結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotSelection {
    /// API に送る原画像座標
    pub image: Hotspot,
    /// マーカー描画用（ズーム前のコンテナ座標）
    pub display: Point,
}

/// contain 描画時の可視領域を求める
pub fn visible_area(rendered: Size, natural: Size) -> Option<VisibleArea> {
    let rendered_ar = rendered.aspect_ratio()?;
    let natural_ar = natural.aspect_ratio()?;

    let area = if natural_ar > rendered_ar {
        // 横いっぱい、上下に余白
        let height = rendered.width / natural_ar;
        VisibleArea {
            size: Size::new(rendered.width, height),
            offset: Point::new(0.0, (rendered.height - height) / 2.0),
        }
    } else {
        // 縦いっぱい、左右に余白
        let width = rendered.height * natural_ar;
        VisibleArea {
            size: Size::new(width, rendered.height),
            offset: Point::new((rendered.width - width) / 2.0, 0.0),
        }
    };
    Some(area)
}

/// 画像要素の矩形内のクリック → 原画像ピクセル。余白上なら None
/// 原画像が1ピクセルに満たない場合も None
pub fn map_to_natural(click: Point, image_rect: Rect, natural: Size) -> Option<Hotspot> {
    if natural.width < 1.0 || natural.height < 1.0 {
        return None;
    }
    let area = visible_area(image_rect.size, natural)?;
    let visible = Rect {
        origin: image_rect.origin + area.offset,
        size: area.size,
    };
    if !visible.contains(click) {
        return None;
    }

    let local = click - visible.origin;
    let ratio = natural.width / area.size.width;
    let x = (local.x * ratio).round().clamp(0.0, natural.width - 1.0);
    let y = (local.y * ratio).round().clamp(0.0, natural.height - 1.0);
    Some(Hotspot::new(x as u32, y as u32))
}

/// コンテナ（ズーム・パンが掛かっている要素）内のクリック位置を変形前の座標に戻す
pub fn display_point(click: Point, container_rect: Rect, scale: f32) -> Option<Point> {
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }
    Some((click - container_rect.origin).scale(1.0 / scale))
}

/// クリック1回から API 座標と表示座標を同時に求める
pub fn select_hotspot(
    click: Point,
    image_rect: Rect,
    natural: Size,
    container_rect: Rect,
    scale: f32,
) -> Option<HotspotSelection> {
    let image = map_to_natural(click, image_rect, natural)?;
    Some(HotspotSelection {
        image,
        display: display_point(click, container_rect, scale)?,
    })
}
