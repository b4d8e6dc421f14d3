use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::extract::ValidJson;
use super::HealthResponse;
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::providers::VoiceSample;
use crate::schema::{StoryRequest, StoryResponse, TtsRequest};
use crate::story::StoryPipeline;
use crate::tts::VoiceSettings;

const DEFAULT_CLONE_DESCRIPTION: &str = "Custom voice created via Echo Tales";

pub async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<TtsRequest>,
) -> Result<Response, AppError> {
    let elevenlabs = state.elevenlabs()?;

    // speed and pitch are validated but the provider call does not take them
    tracing::debug!(
        speed = request.speed,
        pitch = request.pitch,
        "speed and pitch not forwarded"
    );

    let settings = VoiceSettings::for_emotion(&request.emotion);
    tracing::info!(
        voice = %request.voice_id,
        emotion = %request.emotion,
        chars = request.text.chars().count(),
        "synthesizing narration"
    );
    let audio = elevenlabs
        .synthesize(&request.voice_id, &request.text, &settings)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"narration.mp3\"",
            ),
        ],
        audio,
    )
        .into_response())
}

pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let voices = state.elevenlabs()?.list_voices().await?;
    Ok(Json(voices))
}

pub async fn clone_voice(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let mut multipart = multipart?;
    let mut name = None;
    let mut description = None;
    let mut samples = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await?),
            Some("description") => description = Some(field.text().await?),
            Some("sample") => {
                let file_name = field.file_name().unwrap_or("sample").to_string();
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await?;
                if !data.is_empty() {
                    samples.push(VoiceSample {
                        file_name,
                        content_type,
                        data,
                    });
                }
            }
            _ => {}
        }
    }

    if samples.is_empty() {
        return Err(AppError::BadRequest("Voice sample file required".into()));
    }
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Voice name required".into()))?;
    let description = description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CLONE_DESCRIPTION.to_string());

    let elevenlabs = state.elevenlabs()?;
    tracing::info!(name = %name, samples = samples.len(), "cloning voice");
    let created = elevenlabs.clone_voice(&name, &description, samples).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<StoryRequest>,
) -> Result<Json<StoryResponse>, AppError> {
    let pipeline = StoryPipeline {
        openai: state.openai()?,
        elevenlabs: state.elevenlabs()?,
        audio: &state.audio,
    };

    tracing::info!(voice = %request.voice_id, emotion = %request.emotion, "generating story");
    let story = pipeline.run(&request).await?;

    Ok(Json(story))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
