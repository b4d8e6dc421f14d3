//! Request and response shapes shared by the HTTP layer, the story pipeline
//! and the API client, together with their validation rules.

use serde::{Deserialize, Serialize};

/// Text limit, measured in UTF-16 code units the way browser clients count
/// string length.
pub const MAX_TEXT_CHARS: usize = 5000;
pub const SPEED_RANGE: (f64, f64) = (0.5, 2.0);
pub const PITCH_RANGE: (f64, f64) = (-10.0, 10.0);

/// One rejected field of an incoming payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Payloads that check their own field constraints after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    pub text: String,
    pub voice_id: String,
    pub emotion: String,
    pub speed: f64,
    pub pitch: f64,
}

impl Validate for TtsRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let chars = self.text.encode_utf16().count();
        if chars == 0 {
            errors.push(FieldError::new("text", "Text cannot be empty"));
        } else if chars > MAX_TEXT_CHARS {
            errors.push(FieldError::new(
                "text",
                format!("Text too long (max {} chars)", MAX_TEXT_CHARS),
            ));
        }
        if self.voice_id.is_empty() {
            errors.push(FieldError::new("voiceId", "Voice ID is required"));
        }
        check_range(&mut errors, "speed", self.speed, SPEED_RANGE);
        check_range(&mut errors, "pitch", self.pitch, PITCH_RANGE);

        finish(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub prompt: String,
    pub voice_id: String,
    #[serde(default = "default_emotion")]
    pub emotion: String,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub pitch: f64,
}

fn default_emotion() -> String {
    "neutral".to_string()
}

fn default_speed() -> f64 {
    1.0
}

impl Validate for StoryRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.prompt.is_empty() {
            errors.push(FieldError::new("prompt", "Story prompt is required"));
        }
        if self.voice_id.is_empty() {
            errors.push(FieldError::new("voiceId", "Voice ID is required"));
        }
        check_range(&mut errors, "speed", self.speed, SPEED_RANGE);
        check_range(&mut errors, "pitch", self.pitch, PITCH_RANGE);

        finish(errors)
    }
}

fn check_range(errors: &mut Vec<FieldError>, path: &str, value: f64, (min, max): (f64, f64)) {
    if !(min..=max).contains(&value) {
        errors.push(FieldError::new(
            path,
            format!("Must be between {} and {}", min, max),
        ));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryScene {
    pub scene_number: u32,
    pub title: String,
    pub content: String,
    pub image_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryResponse {
    pub title: String,
    pub summary: String,
    pub scenes: Vec<StoryScene>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tts(text: &str, speed: f64, pitch: f64) -> TtsRequest {
        TtsRequest {
            text: text.to_string(),
            voice_id: "voice-1".to_string(),
            emotion: "neutral".to_string(),
            speed,
            pitch,
        }
    }

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(tts("a", 0.5, -10.0).validate().is_ok());
        assert!(tts(&"a".repeat(MAX_TEXT_CHARS), 2.0, 10.0).validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_text() {
        let errors = tts("", 1.0, 0.0).validate().unwrap_err();
        assert_eq!(errors[0].path, "text");

        let errors = tts(&"a".repeat(MAX_TEXT_CHARS + 1), 1.0, 0.0)
            .validate()
            .unwrap_err();
        assert_eq!(errors[0].path, "text");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(tts(&"é".repeat(MAX_TEXT_CHARS), 1.0, 0.0).validate().is_ok());
    }

    #[test]
    fn astral_characters_count_twice() {
        let half = MAX_TEXT_CHARS / 2;
        assert!(tts(&"🦊".repeat(half), 1.0, 0.0).validate().is_ok());

        let errors = tts(&"🦊".repeat(half + 1), 1.0, 0.0).validate().unwrap_err();
        assert_eq!(errors[0].path, "text");
        assert_eq!(errors[0].message, "Text too long (max 5000 chars)");
    }

    #[test]
    fn rejects_out_of_range_speed_and_pitch() {
        let errors = tts("hello", 0.49, 10.5).validate().unwrap_err();
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["speed", "pitch"]);
    }

    #[test]
    fn rejects_empty_voice_id() {
        let mut request = tts("hello", 1.0, 0.0);
        request.voice_id.clear();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors[0].path, "voiceId");
    }

    #[test]
    fn tts_request_uses_camel_case() {
        let request: TtsRequest = serde_json::from_value(json!({
            "text": "hi",
            "voiceId": "abc",
            "emotion": "happy",
            "speed": 1.2,
            "pitch": -3
        }))
        .unwrap();
        assert_eq!(request.voice_id, "abc");
        assert_eq!(request.pitch, -3.0);
    }

    #[test]
    fn story_request_fills_defaults() {
        let request: StoryRequest = serde_json::from_value(json!({
            "prompt": "a dragon learns to bake",
            "voiceId": "abc"
        }))
        .unwrap();
        assert_eq!(request.emotion, "neutral");
        assert_eq!(request.speed, 1.0);
        assert_eq!(request.pitch, 0.0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn story_request_requires_prompt() {
        let request: StoryRequest = serde_json::from_value(json!({
            "prompt": "",
            "voiceId": "abc"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("prompt", "Story prompt is required")]);
    }

    #[test]
    fn scene_omits_missing_urls() {
        let scene = StoryScene {
            scene_number: 1,
            title: "Start".into(),
            content: "Once".into(),
            image_prompt: "castle".into(),
            image_url: None,
            audio_url: Some("/audio/x/scene_1.mp3".into()),
        };
        let value = serde_json::to_value(&scene).unwrap();
        assert!(value.get("image_url").is_none());
        assert_eq!(value["audio_url"], "/audio/x/scene_1.mp3");
    }
}
