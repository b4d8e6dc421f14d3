use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid listen address {0}")]
    Address(String),

    #[error("Invalid {name} '{value}': {reason}")]
    Url {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,
    /// Stored story audio older than this is deleted; 0 keeps it forever.
    #[serde(default = "default_audio_retention_secs")]
    pub audio_retention_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,
    #[serde(default = "default_openai_chat_model")]
    pub openai_chat_model: String,
    #[serde(default = "default_openai_image_model")]
    pub openai_image_model: String,

    #[serde(default)]
    pub eleven_labs_api_key: Option<String>,
    #[serde(default = "default_eleven_labs_api_url")]
    pub eleven_labs_api_url: String,
    #[serde(default = "default_eleven_labs_model_id")]
    pub eleven_labs_model_id: String,

    #[serde(default)]
    pub provider_timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "./static".to_string()
}

fn default_audio_dir() -> String {
    "./generated-audio".to_string()
}

fn default_audio_retention_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_chat_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_eleven_labs_api_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_eleven_labs_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(envy::from_env()?)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }

    /// OpenAI key, treating an empty value as unset.
    pub fn openai_key(&self) -> Option<&str> {
        non_empty(self.openai_api_key.as_deref())
    }

    /// ElevenLabs key, treating an empty value as unset.
    pub fn eleven_labs_key(&self) -> Option<&str> {
        non_empty(self.eleven_labs_api_key.as_deref())
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_secs.map(Duration::from_secs)
    }

    pub fn static_dir(&self) -> PathBuf {
        PathBuf::from(&self.static_dir)
    }

    pub fn audio_dir(&self) -> PathBuf {
        PathBuf::from(&self.audio_dir)
    }

    pub fn audio_retention(&self) -> Option<Duration> {
        Some(self.audio_retention_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
