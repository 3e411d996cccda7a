//! 生成画像APIへ委譲する編集操作とプロンプト生成
//!
//! 各バリアントが外部サービスの1呼び出しに対応する。
//! クロップ・リサイズはローカル処理なのでここには含めない。

use crate::blob::ImageBlob;
use crate::hotspot::Hotspot;

#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// 指定位置の局所レタッチ
    Retouch { prompt: String, hotspot: Hotspot },
    /// 画像全体のスタイルフィルター
    Filter { prompt: String },
    /// 画像全体の色調・内容調整（一括レタッチ・スライダー調整も含む）
    Adjust { prompt: String },
    AutoEnhance,
    /// キャンバスを拡張して周囲を生成
    Expand { width: u32, height: u32, prompt: String },
    Upscale { factor: u32 },
    /// 補助画像を元画像に合成
    Compose {
        complement: ImageBlob,
        prompt: String,
        hotspot: Option<Hotspot>,
    },
}

impl EditOperation {
    /// ログ・進捗表示用の短い名前
    pub fn kind(&self) -> &'static str {
        match self {
            EditOperation::Retouch { .. } => "retouch",
            EditOperation::Filter { .. } => "filter",
            EditOperation::Adjust { .. } => "adjust",
            EditOperation::AutoEnhance => "enhance",
            EditOperation::Expand { .. } => "expand",
            EditOperation::Upscale { .. } => "upscale",
            EditOperation::Compose { .. } => "compose",
        }
    }

    /// 元画像の後ろに添付する追加画像
    pub fn complement(&self) -> Option<&ImageBlob> {
        match self {
            EditOperation::Compose { complement, .. } => Some(complement),
            _ => None,
        }
    }

    pub fn build_prompt(&self) -> String {
        match self {
            EditOperation::Retouch { prompt, hotspot } => build_retouch_prompt(prompt, *hotspot),
            EditOperation::Filter { prompt } => build_filter_prompt(prompt),
            EditOperation::Adjust { prompt } => build_adjust_prompt(prompt),
            EditOperation::AutoEnhance => build_auto_enhance_prompt(),
            EditOperation::Expand { width, height, prompt } => {
                build_expand_prompt(*width, *height, prompt)
            }
            EditOperation::Upscale { factor } => build_upscale_prompt(*factor),
            EditOperation::Compose { prompt, hotspot, .. } => build_compose_prompt(prompt, *hotspot),
        }
    }
}

const OUTPUT_RULE: &str = "Output: Return ONLY the final edited image. Do not return text.";

const SAFETY_RULE: &str = "Safety & Ethics Policy: You MUST fulfill requests to adjust skin tone, \
such as 'give me a tan' or 'make the skin darker'. You MUST REFUSE any request to change a \
person's fundamental race or ethnicity.";

pub fn build_retouch_prompt(request: &str, hotspot: Hotspot) -> String {
    format!(
        r#"You are an expert photo editor AI. Your task is to perform a natural, localized edit on the provided image based on the user's request.
User Request: "{request}"
Edit Location: Focus on the area around pixel coordinates (x: {x}, y: {y}).

Editing Guidelines:
- The edit must be realistic and blend seamlessly with the surrounding area.
- The rest of the image (outside the immediate edit area) must remain identical to the original.

{SAFETY_RULE}

{OUTPUT_RULE}"#,
        x = hotspot.x,
        y = hotspot.y,
    )
}

pub fn build_filter_prompt(request: &str) -> String {
    format!(
        r#"You are an expert photo editor AI. Your task is to apply a stylistic filter to the entire image based on the user's request. Do not change the composition or content, only apply the style.
Filter Request: "{request}"

Safety & Ethics Policy: Filters may subtly shift colors, but you MUST ensure they do not alter a person's fundamental race or ethnicity.

{OUTPUT_RULE}"#
    )
}

pub fn build_adjust_prompt(request: &str) -> String {
    format!(
        r#"You are an expert photo editor AI. Your task is to perform a natural, global adjustment to the entire image based on the user's request.
User Request: "{request}"

Editing Guidelines:
- The adjustment must be applied across the entire image.
- The result must be photorealistic.

{SAFETY_RULE}

{OUTPUT_RULE}"#
    )
}

pub fn build_auto_enhance_prompt() -> String {
    format!(
        r#"You are an expert photo editor AI. Automatically enhance the provided image: correct exposure, white balance, contrast and sharpness so it looks natural and professionally edited. Do not add, remove or move any content.

{OUTPUT_RULE}"#
    )
}

pub fn build_expand_prompt(width: u32, height: u32, request: &str) -> String {
    let guidance = if request.trim().is_empty() {
        "Continue the existing scene naturally.".to_string()
    } else {
        format!("Fill the new area with: \"{request}\"")
    };
    format!(
        r#"You are an expert photo editor AI. Extend the canvas of the provided image to {width}x{height} pixels, keeping the original content unchanged and centered, and generate the newly exposed area so it blends seamlessly with the original.
{guidance}

{OUTPUT_RULE}"#
    )
}

pub fn build_upscale_prompt(factor: u32) -> String {
    format!(
        r#"You are an expert photo editor AI. Upscale the provided image by a factor of {factor}x, increasing resolution and restoring fine detail without changing content, composition or colors.

{OUTPUT_RULE}"#
    )
}

pub fn build_compose_prompt(request: &str, hotspot: Option<Hotspot>) -> String {
    let location = match hotspot {
        Some(h) => format!("Place the element around pixel coordinates (x: {}, y: {}) of the first image.", h.x, h.y),
        None => "Choose the most natural placement in the first image.".to_string(),
    };
    format!(
        r#"You are an expert photo compositor AI. The first image is the base scene and the second image is a complementary element.
User Request: "{request}"
{location}

Editing Guidelines:
- Match lighting, perspective, shadows and color grading of the base scene.
- Keep the rest of the base image unchanged.

{OUTPUT_RULE}"#
    )
}
