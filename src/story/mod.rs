pub mod enrich;
pub mod prompt;

use crate::providers::{ElevenLabsClient, OpenAiClient, ProviderError};
use crate::schema::{StoryRequest, StoryResponse, StoryScene};
use crate::tts::{AudioStore, VoiceSettings};

pub use prompt::StoryParseError;

#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Story content could not be parsed: {0}")]
    Malformed(#[from] StoryParseError),

    #[error("Failed to store scene audio: {0}")]
    Storage(#[from] std::io::Error),
}

/// Sequences the LLM, image and speech providers for one story request.
pub struct StoryPipeline<'a> {
    pub openai: &'a OpenAiClient,
    pub elevenlabs: &'a ElevenLabsClient,
    pub audio: &'a AudioStore,
}

impl StoryPipeline<'_> {
    /// Write the story, then illustrate and narrate each scene.
    ///
    /// Only the story text is required; image and audio failures leave the
    /// affected scene without a URL.
    pub async fn run(&self, request: &StoryRequest) -> Result<StoryResponse, StoryError> {
        let reply = self
            .openai
            .complete_json(&prompt::story_messages(&request.prompt))
            .await?;
        let mut story = prompt::parse_story(&reply)?;
        tracing::info!(
            title = %story.title,
            scenes = story.scenes.len(),
            "story written"
        );

        self.illustrate(&mut story.scenes).await;
        self.narrate(&mut story.scenes, request).await;

        Ok(story)
    }

    async fn illustrate(&self, scenes: &mut [StoryScene]) {
        let openai = self.openai;
        let prompts: Vec<String> = scenes
            .iter()
            .map(|scene| prompt::illustration_prompt(&scene.image_prompt))
            .collect();

        let outcomes = enrich::best_effort("scene illustration", prompts, |prompt| async move {
            openai.generate_image(&prompt).await
        })
        .await;

        for (scene, outcome) in scenes.iter_mut().zip(outcomes) {
            scene.image_url = outcome.ok();
        }
    }

    async fn narrate(&self, scenes: &mut [StoryScene], request: &StoryRequest) {
        let elevenlabs = self.elevenlabs;
        let audio = self.audio;
        let voice_id = request.voice_id.as_str();
        let settings = &VoiceSettings::for_emotion(&request.emotion);
        let story_id = &uuid::Uuid::new_v4().simple().to_string();

        let inputs: Vec<(u32, String)> = scenes
            .iter()
            .map(|scene| (scene.scene_number, scene.content.clone()))
            .collect();

        let outcomes = enrich::best_effort(
            "scene narration",
            inputs,
            |(scene_number, content)| async move {
                let bytes = elevenlabs.synthesize(voice_id, &content, settings).await?;
                let url = audio.save_scene(story_id, scene_number, &bytes).await?;
                Ok::<_, StoryError>(url)
            },
        )
        .await;

        for (scene, outcome) in scenes.iter_mut().zip(outcomes) {
            scene.audio_url = outcome.ok();
        }
    }
}
