//! Axum route handler for note-card extraction.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::{parse_json_reply, ChatRequest};
use crate::notes::prompts::{EXTRACT_POINTS_SYSTEM, FALLBACK_POINT, FALLBACK_TITLE};
use crate::state::AppState;

const EXTRACT_FAILED: &str = "Failed to extract points";
const EXTRACT_MAX_TOKENS: u32 = 512;

#[derive(Debug, Deserialize)]
pub struct ExtractPointsRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteCard {
    pub title: String,
    pub points: Vec<String>,
}

impl NoteCard {
    fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            points: vec![FALLBACK_POINT.to_string()],
        }
    }
}

/// Parses the model reply, falling back to a placeholder card.
pub fn note_card_from_reply(reply: &str) -> NoteCard {
    parse_json_reply(reply).unwrap_or_else(|e| {
        warn!("Failed to parse extract-points reply ({e}): {reply}");
        NoteCard::fallback()
    })
}

/// POST /api/extract-points
///
/// An unparseable reply still answers 200 with the fallback card; only an
/// upstream failure is an error.
pub async fn handle_extract_points(
    State(state): State<AppState>,
    body: Result<Json<ExtractPointsRequest>, JsonRejection>,
) -> Result<Json<NoteCard>, AppError> {
    let Json(request) = body.map_err(AppError::invalid_body(EXTRACT_FAILED))?;
    let reply = state
        .chat_model
        .complete(&ChatRequest::single_turn(
            EXTRACT_POINTS_SYSTEM,
            request.content,
            EXTRACT_MAX_TOKENS,
        ))
        .await
        .map_err(AppError::upstream(EXTRACT_FAILED))?;

    Ok(Json(note_card_from_reply(&reply)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fenced_reply() {
        let reply = "```json\n{\"title\": \"慢慢来\", \"points\": [\"先写再改\", \"完成比完美重要\"]}\n```";
        let card = note_card_from_reply(reply);
        assert_eq!(card.title, "慢慢来");
        assert_eq!(card.points.len(), 2);
    }

    #[test]
    fn test_falls_back_on_prose() {
        assert_eq!(note_card_from_reply("抱歉，我无法完成"), NoteCard::fallback());
    }

    #[test]
    fn test_falls_back_on_wrong_shape() {
        assert_eq!(
            note_card_from_reply("{\"headline\": \"x\"}"),
            NoteCard::fallback()
        );
    }
}
