pub mod store;

use serde::Serialize;

pub use store::AudioStore;

/// Low-level tuning parameters sent with every synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
    pub style_exaggeration: f64,
}

impl VoiceSettings {
    /// Map an emotion label onto fixed settings. Labels are matched exactly.
    pub fn for_emotion(emotion: &str) -> Self {
        let mut settings = Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: if emotion == "neutral" { 0.0 } else { 0.5 },
            use_speaker_boost: true,
            style_exaggeration: match emotion {
                "happy" | "excited" => 0.75,
                _ => 0.3,
            },
        };

        if emotion == "whisper" {
            settings.stability = 0.8;
            settings.similarity_boost = 0.3;
        }

        settings
    }
}
