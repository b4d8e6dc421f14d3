use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::providers::{self, ElevenLabsClient, OpenAiClient, ELEVEN_LABS, OPENAI};
use crate::tts::store::AUDIO_ROUTE;
use crate::tts::AudioStore;

pub struct AppState {
    pub openai: Option<OpenAiClient>,
    pub elevenlabs: Option<ElevenLabsClient>,
    pub audio: AudioStore,
    /// Upper bound for a voice-clone upload, in bytes.
    pub upload_limit: usize,
}

impl AppState {
    /// Build provider clients for every configured key.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = providers::http_client(config.provider_timeout())?;
        let openai_url = providers::parse_base_url("OPENAI_API_URL", &config.openai_api_url)?;
        let eleven_labs_url =
            providers::parse_base_url("ELEVEN_LABS_API_URL", &config.eleven_labs_api_url)?;

        let openai = config.openai_key().map(|key| {
            OpenAiClient::new(
                http.clone(),
                key,
                openai_url,
                &config.openai_chat_model,
                &config.openai_image_model,
            )
        });
        let elevenlabs = config.eleven_labs_key().map(|key| {
            ElevenLabsClient::new(http.clone(), key, eleven_labs_url, &config.eleven_labs_model_id)
        });

        Ok(Self {
            openai,
            elevenlabs,
            audio: AudioStore::new(config.audio_dir()),
            upload_limit: config.max_upload_bytes,
        })
    }

    pub fn openai(&self) -> Result<&OpenAiClient, AppError> {
        self.openai.as_ref().ok_or(AppError::MissingApiKey(OPENAI))
    }

    pub fn elevenlabs(&self) -> Result<&ElevenLabsClient, AppError> {
        self.elevenlabs
            .as_ref()
            .ok_or(AppError::MissingApiKey(ELEVEN_LABS))
    }
}

pub fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/tts", post(handlers::text_to_speech))
        .route("/voices", get(handlers::list_voices))
        .route(
            "/voices/clone",
            post(handlers::clone_voice).layer(DefaultBodyLimit::max(state.upload_limit)),
        )
        .route("/stories", post(handlers::generate_story))
        .route("/health", get(handlers::health));

    let audio_files = ServeDir::new(state.audio.root());

    Router::new()
        .nest("/api", api_routes)
        .nest_service(AUDIO_ROUTE, audio_files)
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
