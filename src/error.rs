use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::providers::{OpenAiFailure, ProviderError, OPENAI};
use crate::schema::FieldError;
use crate::story::StoryError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid request body")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Upload too large")]
    PayloadTooLarge(String),

    #[error("{0} API key not configured")]
    MissingApiKey(&'static str),

    /// Non-success answer from a provider, relayed with its status and body.
    #[error("Error from {provider} API")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("API quota exceeded")]
    QuotaExceeded,

    #[error("Invalid request to {provider} API")]
    UpstreamRejected {
        provider: &'static str,
        details: String,
    },

    #[error("Error with {provider} services")]
    StoryFailed {
        provider: &'static str,
        details: String,
    },

    #[error("Internal server error")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Status {
                provider,
                status,
                body,
            } => AppError::Upstream {
                provider,
                status,
                body,
            },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<StoryError> for AppError {
    fn from(error: StoryError) -> Self {
        match error {
            StoryError::Provider(e) => match OpenAiFailure::classify(&e) {
                OpenAiFailure::QuotaExceeded => AppError::QuotaExceeded,
                OpenAiFailure::InvalidRequest(details) => AppError::UpstreamRejected {
                    provider: OPENAI,
                    details,
                },
                OpenAiFailure::Other => {
                    tracing::error!("Story generation failed: {}", e);
                    AppError::StoryFailed {
                        provider: OPENAI,
                        details: "Unable to generate story content at this time.".to_string(),
                    }
                }
            },
            StoryError::Malformed(e) => AppError::StoryFailed {
                provider: OPENAI,
                details: format!("Story content could not be parsed: {}", e),
            },
            StoryError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(error.body_text())
        } else {
            AppError::BadRequest(format!("Invalid multipart body: {}", error.body_text()))
        }
    }
}

/// A clone request that is not `multipart/form-data` carries no sample.
impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!("Multipart rejected: {}", rejection.body_text());
        AppError::BadRequest("Voice sample file required".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, details, errors) = match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", None, errors)
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", None, Vec::new()),
            AppError::PayloadTooLarge(cause) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                Some(cause),
                Vec::new(),
            ),
            AppError::MissingApiKey(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NOT_CONFIGURED",
                None,
                Vec::new(),
            ),
            AppError::Upstream { status, body, .. } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_ERROR",
                Some(body),
                Vec::new(),
            ),
            AppError::QuotaExceeded => (
                StatusCode::PAYMENT_REQUIRED,
                "QUOTA_EXCEEDED",
                Some(
                    "The OpenAI API quota has been exceeded. Please update your API key or try again later."
                        .to_string(),
                ),
                Vec::new(),
            ),
            AppError::UpstreamRejected { details, .. } => (
                StatusCode::BAD_REQUEST,
                "UPSTREAM_REJECTED",
                Some(details),
                Vec::new(),
            ),
            AppError::StoryFailed { details, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORY_FAILED",
                Some(details),
                Vec::new(),
            ),
            AppError::Internal(cause) => {
                tracing::error!("Internal error: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    None,
                    Vec::new(),
                )
            }
        };

        tracing::error!("Request failed: {} - {}", code, message);

        (
            status,
            Json(ErrorResponse {
                message,
                code: code.to_string(),
                details,
                errors,
            }),
        )
            .into_response()
    }
}
