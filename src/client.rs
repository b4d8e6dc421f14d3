//! Typed client for the Echo Tales HTTP API.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Url;

use crate::error::ErrorResponse;
use crate::providers::VoiceSample;
use crate::schema::{StoryRequest, StoryResponse, TtsRequest};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The server answered with an error body.
    #[error("{message} (status {status})")]
    Server { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    BaseUrl(String),
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::BaseUrl(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::BaseUrl(e.to_string()))
    }

    pub async fn generate_speech(&self, request: &TtsRequest) -> Result<Bytes, ClientError> {
        let response = self
            .http
            .post(self.url("/api/tts")?)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response, "Failed to generate speech").await?;
        Ok(response.bytes().await?)
    }

    pub async fn fetch_voices(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.http.get(self.url("/api/voices")?).send().await?;
        let response = ensure_success(response, "Failed to fetch voices").await?;
        Ok(response.json().await?)
    }

    pub async fn clone_voice(
        &self,
        name: &str,
        samples: Vec<VoiceSample>,
    ) -> Result<serde_json::Value, ClientError> {
        let mut form = Form::new().text("name", name.to_string());
        for sample in samples {
            let mut part = Part::bytes(sample.data.to_vec()).file_name(sample.file_name);
            if let Some(content_type) = sample.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part("sample", part);
        }

        let response = self
            .http
            .post(self.url("/api/voices/clone")?)
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response, "Failed to clone voice").await?;
        Ok(response.json().await?)
    }

    pub async fn generate_story(&self, request: &StoryRequest) -> Result<StoryResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/stories")?)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response, "Failed to generate story").await?;
        Ok(response.json().await?)
    }
}

async fn ensure_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = match serde_json::from_slice::<ErrorResponse>(&body) {
        Ok(ErrorResponse {
            message,
            details: Some(details),
            ..
        }) => format!("{}: {}", message, details),
        Ok(ErrorResponse { message, .. }) if !message.is_empty() => message,
        _ => fallback.to_string(),
    };

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}
