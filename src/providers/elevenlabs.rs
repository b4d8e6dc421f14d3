//! ElevenLabs speech synthesis, voice catalog and instant voice cloning.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Serialize;

use super::{check_status, endpoint, transport, ProviderError, ELEVEN_LABS};
use crate::tts::VoiceSettings;

const API_KEY_HEADER: &str = "xi-api-key";

/// One uploaded audio sample for voice cloning.
#[derive(Debug, Clone)]
pub struct VoiceSample {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    model_id: String,
}

impl ElevenLabsClient {
    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        base_url: Url,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url,
            model_id: model_id.into(),
        }
    }

    /// Synthesize `text` with `voice_id`, returning MPEG audio bytes.
    pub async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Bytes, ProviderError> {
        let mut url = endpoint(&self.base_url, &["text-to-speech", voice_id]);
        url.query_pairs_mut()
            .append_pair("optimize_streaming_latency", "0");

        let body = SpeechBody {
            text,
            model_id: &self.model_id,
            voice_settings: settings,
        };

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport(ELEVEN_LABS))?;

        check_status(ELEVEN_LABS, response)
            .await?
            .bytes()
            .await
            .map_err(transport(ELEVEN_LABS))
    }

    /// Fetch the provider's voice catalog unchanged.
    pub async fn list_voices(&self) -> Result<serde_json::Value, ProviderError> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["voices"]))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(transport(ELEVEN_LABS))?;

        check_status(ELEVEN_LABS, response)
            .await?
            .json()
            .await
            .map_err(|e| decode(e.to_string()))
    }

    /// Register a cloned voice from one or more samples and return the created record.
    pub async fn clone_voice(
        &self,
        name: &str,
        description: &str,
        samples: Vec<VoiceSample>,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut form = Form::new()
            .text("name", name.to_string())
            .text("description", description.to_string());

        for sample in samples {
            let mut part = Part::bytes(sample.data.to_vec()).file_name(sample.file_name);
            if let Some(content_type) = sample.content_type {
                part = part.mime_str(&content_type).map_err(transport(ELEVEN_LABS))?;
            }
            form = form.part("files", part);
        }

        let response = self
            .http
            .post(endpoint(&self.base_url, &["voices", "add"]))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport(ELEVEN_LABS))?;

        check_status(ELEVEN_LABS, response)
            .await?
            .json()
            .await
            .map_err(|e| decode(e.to_string()))
    }
}

fn decode(message: String) -> ProviderError {
    ProviderError::Decode {
        provider: ELEVEN_LABS,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{http_client, parse_base_url};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ElevenLabsClient {
        ElevenLabsClient::new(
            http_client(None).unwrap(),
            "xi-test",
            parse_base_url("ELEVEN_LABS_API_URL", &server.uri()).unwrap(),
            "eleven_multilingual_v2",
        )
    }

    #[tokio::test]
    async fn synthesize_posts_settings_and_returns_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text-to-speech/voice-1"))
            .and(query_param("optimize_streaming_latency", "0"))
            .and(header("xi-api-key", "xi-test"))
            .and(body_json(json!({
                "text": "Hello there",
                "model_id": "eleven_multilingual_v2",
                "voice_settings": {
                    "stability": 0.8,
                    "similarity_boost": 0.3,
                    "style": 0.5,
                    "use_speaker_boost": true,
                    "style_exaggeration": 0.3
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client(&server)
            .synthesize("voice-1", "Hello there", &VoiceSettings::for_emotion("whisper"))
            .await
            .unwrap();
        assert_eq!(&audio[..], b"ID3fake");
    }

    #[tokio::test]
    async fn synthesize_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text-to-speech/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\":\"voice_not_found\"}"))
            .mount(&server)
            .await;

        let err = client(&server)
            .synthesize("missing", "Hi", &VoiceSettings::for_emotion("neutral"))
            .await
            .unwrap_err();
        match err {
            ProviderError::Status { status, body, provider } => {
                assert_eq!(status, 404);
                assert_eq!(provider, ELEVEN_LABS);
                assert!(body.contains("voice_not_found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn list_voices_passes_catalog_through() {
        let server = MockServer::start().await;
        let catalog = json!({ "voices": [{ "voice_id": "abc", "name": "Rachel", "labels": { "accent": "american" } }] });
        Mock::given(method("GET"))
            .and(path("/voices"))
            .and(header("xi-api-key", "xi-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog.clone()))
            .mount(&server)
            .await;

        let voices = client(&server).list_voices().await.unwrap();
        assert_eq!(voices, catalog);
    }

    #[tokio::test]
    async fn clone_voice_sends_every_sample_as_files() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/voices/add"))
            .and(body_string_contains("name=\"name\""))
            .and(body_string_contains("Narrator"))
            .and(body_string_contains("filename=\"one.mp3\""))
            .and(body_string_contains("filename=\"two.wav\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "voice_id": "new-voice" })))
            .expect(1)
            .mount(&server)
            .await;

        let samples = vec![
            VoiceSample {
                file_name: "one.mp3".into(),
                content_type: Some("audio/mpeg".into()),
                data: Bytes::from_static(b"one"),
            },
            VoiceSample {
                file_name: "two.wav".into(),
                content_type: None,
                data: Bytes::from_static(b"two"),
            },
        ];
        let created = client(&server)
            .clone_voice("Narrator", "test voice", samples)
            .await
            .unwrap();
        assert_eq!(created["voice_id"], "new-voice");
    }
}
