//! Gemini API連携（画像生成・編集）
//!
//! 元画像（合成時は補助画像も）をinline dataで送り、
//! レスポンス中の最初の画像パートを新しいバージョンとして返す。

use super::retry::{with_backoff, RetryPolicy};
use super::ImageEditor;
use crate::config::Config;
use crate::error::{PhotoEditError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use photo_edit_common::{EditError, EditOperation, ImageBlob};
use serde::{Deserialize, Serialize};

/// Gemini APIリクエスト
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
    block_reason_message: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

/// APIキーはURLに載せずヘッダーで送る（エラー文にURLが含まれるため）
const API_KEY_HEADER: &str = "x-goog-api-key";

fn transport_error(e: reqwest::Error) -> EditError {
    EditError::Transport(e.without_url().to_string())
}

pub struct GeminiEditor {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl GeminiEditor {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PhotoEditError::Config(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}:generateContent",
                config.api_base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
            retry: RetryPolicy::from_config(config),
        })
    }

    async fn call_once(&self, request: &GenerateRequest) -> std::result::Result<ImageBlob, EditError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(EditError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| EditError::Decode(e.to_string()))?;
        extract_image(parsed)
    }
}

impl ImageEditor for GeminiEditor {
    async fn edit(
        &self,
        source: &ImageBlob,
        op: &EditOperation,
    ) -> std::result::Result<ImageBlob, EditError> {
        let request = build_request(source, op);
        log::debug!("Gemini {}: {}", op.kind(), self.endpoint);
        with_backoff(&self.retry, || self.call_once(&request)).await
    }
}

fn inline_part(blob: &ImageBlob) -> Part {
    Part::InlineData {
        inline_data: InlineData {
            mime_type: blob.mime_type().to_string(),
            data: BASE64.encode(blob.bytes()),
        },
    }
}

fn build_request(source: &ImageBlob, op: &EditOperation) -> GenerateRequest {
    let mut parts = vec![inline_part(source)];
    if let Some(complement) = op.complement() {
        parts.push(inline_part(complement));
    }
    parts.push(Part::Text {
        text: op.build_prompt(),
    });

    GenerateRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE", "TEXT"],
        },
    }
}

/// レスポンスから画像を取り出す。ブロック・停止・画像なしを区別する
fn extract_image(response: GenerateResponse) -> std::result::Result<ImageBlob, EditError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| {
        f.block_reason.map(|reason| match f.block_reason_message {
            Some(message) => format!("{}. {}", reason, message),
            None => reason,
        })
    }) {
        return Err(EditError::Blocked(reason));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(EditError::NoImage(String::new()));
    };

    let mut texts = Vec::new();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(inline) = part.inline_data {
            let bytes = BASE64
                .decode(inline.data.as_bytes())
                .map_err(|e| EditError::Decode(e.to_string()))?;
            return Ok(ImageBlob::new(bytes, inline.mime_type));
        }
        if let Some(text) = part.text {
            texts.push(text);
        }
    }

    if let Some(reason) = candidate.finish_reason.filter(|r| r != "STOP") {
        return Err(EditError::Stopped(reason));
    }

    let detail = if texts.is_empty() {
        String::new()
    } else {
        format!(". The model responded with text: \"{}\"", texts.join(" "))
    };
    Err(EditError::NoImage(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_edit_common::Hotspot;

    fn parse(json: &str) -> std::result::Result<ImageBlob, EditError> {
        extract_image(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_extract_inline_image() {
        let data = BASE64.encode([1u8, 2, 3]);
        let json = format!(
            r#"{{"candidates":[{{"content":{{"parts":[{{"text":"here"}},{{"inlineData":{{"mimeType":"image/png","data":"{}"}}}}]}},"finishReason":"STOP"}}]}}"#,
            data
        );
        let blob = parse(&json).unwrap();
        assert_eq!(blob.bytes(), &[1, 2, 3]);
        assert_eq!(blob.mime_type(), "image/png");
    }

    #[test]
    fn test_blocked_prompt() {
        let err = parse(r#"{"promptFeedback":{"blockReason":"SAFETY","blockReasonMessage":"unsafe"}}"#)
            .unwrap_err();
        assert_eq!(err, EditError::Blocked("SAFETY. unsafe".into()));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_stopped_without_image() {
        let err = parse(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"IMAGE_SAFETY"}]}"#)
            .unwrap_err();
        assert_eq!(err, EditError::Stopped("IMAGE_SAFETY".into()));
    }

    #[test]
    fn test_text_only_response() {
        let err = parse(r#"{"candidates":[{"content":{"parts":[{"text":"I cannot"}]},"finishReason":"STOP"}]}"#)
            .unwrap_err();
        match err {
            EditError::NoImage(detail) => assert!(detail.contains("I cannot")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(parse("{}").unwrap_err(), EditError::NoImage(String::new()));
    }

    #[test]
    fn test_compose_request_has_two_images() {
        let source = ImageBlob::new(vec![1], "image/jpeg");
        let op = EditOperation::Compose {
            complement: ImageBlob::new(vec![2], "image/png"),
            prompt: "merge".into(),
            hotspot: Some(Hotspot::new(1, 2)),
        };
        let value = serde_json::to_value(build_request(&source, &op)).unwrap();
        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert!(parts[2]["text"].as_str().unwrap().contains("merge"));
        assert_eq!(value["generationConfig"]["responseModalities"][0], "IMAGE");
    }
}
