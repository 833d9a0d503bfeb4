use std::path::Path;

use application::vision::{VisionClient, VisionError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;

const FALLBACK_MIME: &str = "image/jpeg";

const LINEUP_PROMPT: &str = "This is a concert or music festival lineup poster. \
First line: the event or festival name, formatted as `EVENT: <name>`. \
Then a line containing only `ARTISTS:`, followed by the artist/DJ/band names performing, one per line. \
Do not include dates, venues, sponsors, or other text. Only list the actual performers. \
Headliners may use a different font size, and tiers of artists may use different sizes and styles. \
Artist names may be separated by different delimiters; do not include any leading or trailing punctuation.";

/// OpenAI Chat Completions 视觉客户端
#[derive(Debug, Clone)]
pub struct OpenAiVision {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiVision {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn build_request(&self, image: &[u8], mime_type: &str) -> ChatCompletionRequest {
        let data_url = format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(image));
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    MessageContent::Text {
                        text: LINEUP_PROMPT.to_string(),
                    },
                    MessageContent::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
        }
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String, VisionError> {
        let response = self
            .client
            .post(self.config.chat_completions_url())
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| VisionError::Http(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| VisionError::Http(format!("failed to parse response: {err}")))?;
        extract_text_response(parsed)
    }
}

/// 按扩展名推断图片类型，无法识别时按 JPEG 处理
fn image_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

#[async_trait]
impl VisionClient for OpenAiVision {
    async fn describe_lineup(&self, image_path: &Path) -> Result<String, VisionError> {
        let image = tokio::fs::read(image_path).await?;
        let mime_type = image_mime(image_path);
        info!(
            "querying vision model {} ({} bytes, {})",
            self.config.model,
            image.len(),
            mime_type
        );
        let request = self.build_request(&image, &mime_type);
        let text = self.send_request(&request).await?;
        debug!("vision model answered {} chars", text.len());
        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<MessageContent>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, VisionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(VisionError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: &str) -> VisionError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());
    VisionError::Api {
        status: status.as_u16(),
        message,
    }
}
