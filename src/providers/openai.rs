//! OpenAI chat completions (JSON mode) and image generation.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{check_status, endpoint, transport, ProviderError, OPENAI};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2000;
const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";
const IMAGE_STYLE: &str = "vivid";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    chat_model: String,
    image_model: String,
}

impl OpenAiClient {
    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        base_url: Url,
        chat_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url,
            chat_model: chat_model.into(),
            image_model: image_model.into(),
        }
    }

    /// Run a chat completion in JSON mode and return the raw message content.
    ///
    /// A reply without content yields an empty string; judging its shape is
    /// left to the caller.
    pub async fn complete_json(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.chat_model,
            "messages": messages,
            "response_format": { "type": "json_object" },
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .http
            .post(endpoint(&self.base_url, &["chat", "completions"]))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport(OPENAI))?;
        let completion: ChatCompletion = check_status(OPENAI, response)
            .await?
            .json()
            .await
            .map_err(|e| decode(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| decode("completion contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        tracing::debug!(chars = content.len(), "chat completion received");
        Ok(content)
    }

    /// Generate one image and return its URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": 1,
            "size": IMAGE_SIZE,
            "quality": IMAGE_QUALITY,
            "style": IMAGE_STYLE,
        });

        let response = self
            .http
            .post(endpoint(&self.base_url, &["images", "generations"]))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport(OPENAI))?;
        let images: ImageResponse = check_status(OPENAI, response)
            .await?
            .json()
            .await
            .map_err(|e| decode(e.to_string()))?;

        images
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| decode("image response contained no url".to_string()))
    }
}

fn decode(message: String) -> ProviderError {
    ProviderError::Decode {
        provider: OPENAI,
        message,
    }
}

/// How an OpenAI failure should be reported to the story caller.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenAiFailure {
    QuotaExceeded,
    InvalidRequest(String),
    Other,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl OpenAiFailure {
    pub fn classify(error: &ProviderError) -> Self {
        let ProviderError::Status { body, .. } = error else {
            return OpenAiFailure::Other;
        };
        let Ok(ErrorEnvelope { error }) = serde_json::from_str::<ErrorEnvelope>(body) else {
            return OpenAiFailure::Other;
        };

        let is = |wanted: &str| {
            error.kind.as_deref() == Some(wanted) || error.code.as_deref() == Some(wanted)
        };
        let message = error.message.unwrap_or_default();
        if is("insufficient_quota") || message.contains("quota") {
            OpenAiFailure::QuotaExceeded
        } else if is("invalid_request_error") {
            OpenAiFailure::InvalidRequest(message)
        } else {
            OpenAiFailure::Other
        }
    }
}
