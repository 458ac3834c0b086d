//! Axum route handler for persona generation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::{parse_json_reply, ChatRequest};
use crate::models::{Platform, PlatformPersona};
use crate::persona::prompts::{build_persona_user_prompt, GENERATE_PERSONA_SYSTEM};
use crate::state::AppState;

const PERSONA_FAILED: &str = "Failed to generate persona";
const PERSONA_MAX_TOKENS: u32 = 512;

#[derive(Debug, Deserialize)]
pub struct GeneratePersonaRequest {
    pub platform: Platform,
    #[serde(default)]
    pub answers: Vec<String>,
}

/// Shape of the model's reply; `isCustom` is ours to set, not the model's.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonaReply {
    platform_bio: String,
    tone: String,
    style_notes: String,
}

fn fallback_persona(platform: Platform) -> PlatformPersona {
    PlatformPersona {
        platform_bio: format!("{} 内容创作者", platform.display_name()),
        tone: "真诚、专业".to_string(),
        style_notes: "保持自然表达".to_string(),
        is_custom: true,
    }
}

/// Parses the model reply into a custom persona, falling back to a generic one.
pub fn persona_from_reply(platform: Platform, reply: &str) -> PlatformPersona {
    match parse_json_reply::<PersonaReply>(reply) {
        Ok(p) => PlatformPersona {
            platform_bio: p.platform_bio,
            tone: p.tone,
            style_notes: p.style_notes,
            is_custom: true,
        },
        Err(e) => {
            warn!("Failed to parse persona reply ({e}): {reply}");
            fallback_persona(platform)
        }
    }
}

/// POST /api/generate-persona
pub async fn handle_generate_persona(
    State(state): State<AppState>,
    body: Result<Json<GeneratePersonaRequest>, JsonRejection>,
) -> Result<Json<PlatformPersona>, AppError> {
    let Json(request) = body.map_err(AppError::invalid_body(PERSONA_FAILED))?;
    let reply = state
        .chat_model
        .complete(&ChatRequest::single_turn(
            GENERATE_PERSONA_SYSTEM,
            build_persona_user_prompt(request.platform, &request.answers),
            PERSONA_MAX_TOKENS,
        ))
        .await
        .map_err(AppError::upstream(PERSONA_FAILED))?;

    Ok(Json(persona_from_reply(request.platform, &reply)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_becomes_custom_persona() {
        let reply = r#"{"platformBio": "把复杂讲简单的工程师", "tone": "直接, 幽默", "styleNotes": "多用类比，少用术语"}"#;
        let persona = persona_from_reply(Platform::Linkedin, reply);
        assert_eq!(persona.platform_bio, "把复杂讲简单的工程师");
        assert!(persona.is_custom);
    }

    #[test]
    fn test_model_cannot_unset_is_custom() {
        let reply = r#"{"platformBio": "b", "tone": "t", "styleNotes": "s", "isCustom": false}"#;
        assert!(persona_from_reply(Platform::Twitter, reply).is_custom);
    }

    #[test]
    fn test_fallback_names_platform() {
        let persona = persona_from_reply(Platform::Xiaohongshu, "I cannot do that");
        assert_eq!(persona.platform_bio, "小红书 内容创作者");
        assert_eq!(persona.tone, "真诚、专业");
        assert!(persona.is_custom);
    }
}
