//! Prompt templates for story generation and the strict parser for the
//! model's JSON reply.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::providers::ChatMessage;
use crate::schema::{StoryResponse, StoryScene};

const SYSTEM_PROMPT: &str = "You are a professional storyteller and comic book writer. \
You write engaging, age-appropriate short stories in a comic book style, divided into scenes. \
Every scene is vivid and visual, with a focus on action and dialogue.";

const RESPONSE_FORMAT: &str = r#"{
  "title": "Story title",
  "summary": "A brief summary of the story",
  "scenes": [
    {
      "scene_number": 1,
      "title": "Scene title",
      "content": "Scene narrative text",
      "image_prompt": "Detailed visual prompt for a comic book style image of this scene"
    }
  ]
}"#;

lazy_static! {
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").unwrap();
}

/// Messages asking the model for a 3-5 scene story as strict JSON.
pub fn story_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Create a story based on this prompt: \"{}\". \
Respond with a JSON object with exactly this structure:\n{}\n\n\
Write 3-5 scenes, each with descriptive narrative content and a very specific image prompt. \
The image prompts should be detailed enough for comic-book style illustrations.",
            prompt, RESPONSE_FORMAT
        )),
    ]
}

/// Wrap a scene's image prompt in the fixed comic-book illustration style.
pub fn illustration_prompt(image_prompt: &str) -> String {
    format!(
        "Comic book style illustration of {}. Vibrant colors, dynamic composition, \
strong line work, dramatic lighting, superhero comic aesthetic.",
        image_prompt
    )
}

#[derive(thiserror::Error, Debug)]
pub enum StoryParseError {
    #[error("reply is not a valid story object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("story has no scenes")]
    NoScenes,

    #[error("scene {0} has no content")]
    EmptyScene(usize),
}

#[derive(Deserialize)]
struct DraftStory {
    title: String,
    summary: String,
    scenes: Vec<DraftScene>,
}

#[derive(Deserialize)]
struct DraftScene {
    #[serde(default)]
    scene_number: Option<u32>,
    title: String,
    content: String,
    image_prompt: String,
}

/// Parse the model reply into a typed story without images or audio.
///
/// Scenes keep their reply order and are renumbered 1..n.
pub fn parse_story(reply: &str) -> Result<StoryResponse, StoryParseError> {
    let json = CODE_FENCE
        .captures(reply)
        .and_then(|cap| cap.get(1))
        .map_or(reply, |m| m.as_str());

    let draft: DraftStory = serde_json::from_str(json)?;
    if draft.scenes.is_empty() {
        return Err(StoryParseError::NoScenes);
    }

    let mut scenes = Vec::with_capacity(draft.scenes.len());
    for (index, scene) in draft.scenes.into_iter().enumerate() {
        let position = index + 1;
        if scene.content.trim().is_empty() {
            return Err(StoryParseError::EmptyScene(position));
        }
        if scene.scene_number != Some(position as u32) {
            tracing::debug!(
                reported = ?scene.scene_number,
                position,
                "renumbering scene"
            );
        }
        scenes.push(StoryScene {
            scene_number: position as u32,
            title: scene.title,
            content: scene.content,
            image_prompt: scene.image_prompt,
            image_url: None,
            audio_url: None,
        });
    }

    Ok(StoryResponse {
        title: draft.title,
        summary: draft.summary,
        scenes,
    })
}
