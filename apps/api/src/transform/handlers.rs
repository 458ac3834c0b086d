//! Axum route handler for the Transform API.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::ChatRequest;
use crate::models::{Audience, ContentAngle, OutputLanguage, OutputLength, Platform, Profile};
use crate::state::AppState;
use crate::streaming::relay;
use crate::transform::prompts::{
    build_platform_transform_prompt, max_tokens_for, with_profile_context, TransformOptions,
};

const TRANSFORM_FAILED: &str = "Failed to transform content";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /api/transform`. Omitted options take the
/// platform-neutral defaults (`twitter`, `normal`, `auto`, `peers`, `sharing`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub content: String,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub length: OutputLength,
    #[serde(default)]
    pub language: OutputLanguage,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub angle: ContentAngle,
    /// `true` relays SSE; `false` answers `{"result": ...}` (background prefetch).
    #[serde(default)]
    pub stream: bool,
}

impl TransformRequest {
    pub fn options(&self) -> TransformOptions {
        TransformOptions {
            length: self.length,
            language: self.language,
            audience: self.audience,
            angle: self.angle,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResponse {
    pub result: String,
}

/// Full system prompt for a request: platform prompt, plus the global profile
/// voice when the platform has no custom persona.
pub fn build_system_prompt(request: &TransformRequest) -> String {
    let persona = request
        .profile
        .as_ref()
        .and_then(|p| p.persona_for(request.platform));

    let prompt = build_platform_transform_prompt(request.platform, persona, &request.options());

    match &request.profile {
        Some(profile) if !persona.is_some_and(|p| p.is_custom) => {
            with_profile_context(prompt, profile)
        }
        _ => prompt,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/transform
///
/// Streams SSE text deltas when `stream` is set, otherwise returns the whole
/// completion as JSON.
pub async fn handle_transform(
    State(state): State<AppState>,
    body: Result<Json<TransformRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body.map_err(AppError::invalid_body(TRANSFORM_FAILED))?;
    let system = build_system_prompt(&request);
    let max_tokens = max_tokens_for(request.platform, request.length);

    info!(
        platform = %request.platform,
        length = ?request.length,
        language = ?request.language,
        stream = request.stream,
        "Transforming content"
    );

    let llm_request = ChatRequest::single_turn(system, request.content, max_tokens);

    if request.stream {
        let deltas = state
            .chat_model
            .stream(&llm_request)
            .await
            .map_err(AppError::upstream(TRANSFORM_FAILED))?;
        return Ok(relay(deltas).into_response());
    }

    let result = state
        .chat_model
        .complete(&llm_request)
        .await
        .map_err(AppError::upstream(TRANSFORM_FAILED))?;

    Ok(Json(TransformResponse { result }).into_response())
}
