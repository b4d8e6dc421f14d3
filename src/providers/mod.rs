//! HTTP clients for the third-party services Echo Tales orchestrates.

pub mod elevenlabs;
pub mod openai;

use std::time::Duration;

use reqwest::Url;

use crate::config::ConfigError;

pub use elevenlabs::{ElevenLabsClient, VoiceSample};
pub use openai::{ChatMessage, OpenAiClient, OpenAiFailure};

pub const OPENAI: &str = "OpenAI";
pub const ELEVEN_LABS: &str = "ElevenLabs";

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {provider}: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

/// Build the connection pool shared by every provider client.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().pool_max_idle_per_host(10);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

pub(crate) fn parse_base_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Url {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Url {
            name,
            value: value.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Turn a non-success response into `ProviderError::Status`, keeping the raw body.
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn transport(provider: &'static str) -> impl FnOnce(reqwest::Error) -> ProviderError {
    move |source| ProviderError::Transport { provider, source }
}
