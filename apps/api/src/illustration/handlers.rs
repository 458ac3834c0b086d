//! Axum route handler for illustration generation.
//!
//! Flow: custom prompt OR Claude highlight extraction → style suffix → image model.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::illustration::prompts::{build_image_prompt, EXTRACT_HIGHLIGHT_SYSTEM};
use crate::llm_client::ChatRequest;
use crate::state::AppState;

const HIGHLIGHT_MAX_TOKENS: u32 = 256;
const NO_IMAGE_DATA: &str = "DALL-E did not return image data";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IllustrationRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IllustrationResponse {
    pub prompt: String,
    pub highlight: String,
    /// `data:image/png;base64,...`
    pub image: String,
}

/// POST /api/generate-anime-image
pub async fn handle_generate_illustration(
    State(state): State<AppState>,
    body: Result<Json<IllustrationRequest>, JsonRejection>,
) -> Result<Json<IllustrationResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::ImageGeneration {
        details: e.body_text(),
        prompt: None,
        highlight: None,
    })?;
    let images = state
        .image_model
        .clone()
        .ok_or(AppError::NotConfigured("OPENAI_API_KEY not configured"))?;

    let highlight = match request.custom_prompt.filter(|p| !p.is_empty()) {
        Some(custom) => {
            info!("Using custom illustration prompt");
            custom
        }
        None => {
            info!("Extracting illustration highlight");
            state
                .chat_model
                .complete(&ChatRequest::single_turn(
                    EXTRACT_HIGHLIGHT_SYSTEM,
                    request.content,
                    HIGHLIGHT_MAX_TOKENS,
                ))
                .await
                .map_err(|e| AppError::ImageGeneration {
                    details: e.to_string(),
                    prompt: None,
                    highlight: None,
                })?
        }
    };

    let prompt = build_image_prompt(&highlight);
    info!(
        "Illustration prompt: {}...",
        prompt.chars().take(100).collect::<String>()
    );

    let image = images
        .generate(&prompt)
        .await
        .map_err(|e| AppError::ImageGeneration {
            details: e.to_string(),
            prompt: None,
            highlight: None,
        })?
        .ok_or_else(|| AppError::ImageGeneration {
            details: NO_IMAGE_DATA.to_string(),
            prompt: Some(prompt.clone()),
            highlight: Some(highlight.clone()),
        })?;

    Ok(Json(IllustrationResponse {
        prompt,
        highlight,
        image: format!("data:image/png;base64,{image}"),
    }))
}
