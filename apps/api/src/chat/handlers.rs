//! Axum route handler for the co-think chat.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chat::prompts::{build_cothink_system_prompt, IMAGE_ONLY_PROMPT};
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, ChatRequest, ContentPart, ImageSource, MessageContent};
use crate::models::{Message, Profile, Role};
use crate::state::AppState;
use crate::streaming::relay;

const CHAT_FAILED: &str = "Failed to process chat request";
const CHAT_MAX_TOKENS: u32 = 1024;

/// Largest image file a chat turn may attach, before base64 encoding.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for `/api/chat`. Every turn resends the full history,
/// so this leaves room for several encoded images.
pub const CHAT_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBody {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Splits `data:<media type>;base64,<payload>` into its two parts.
fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (media_type, data) = rest.split_once(";base64,")?;
    (!media_type.is_empty() && !data.is_empty()).then_some((media_type, data))
}

/// Converts a client message into the model's content format.
///
/// Assistant turns are always plain text. A user turn with an image becomes an
/// image block (when the data URI parses) followed by a text block.
pub fn format_message(message: &Message) -> ChatMessage {
    let content = match (message.role, &message.image) {
        (Role::User, Some(image)) => {
            let mut parts = Vec::with_capacity(2);
            match parse_data_uri(image) {
                Some((media_type, data)) => parts.push(ContentPart::Image {
                    source: ImageSource::base64(media_type, data),
                }),
                None => debug!("Dropping image with unparseable data URI"),
            }
            let text = if message.content.is_empty() {
                IMAGE_ONLY_PROMPT.to_string()
            } else {
                message.content.clone()
            };
            parts.push(ContentPart::Text { text });
            MessageContent::Blocks(parts)
        }
        _ => MessageContent::Text(message.content.clone()),
    };

    ChatMessage {
        role: message.role,
        content,
    }
}

/// POST /api/chat
///
/// Always streams. Same SSE framing as the transform route.
pub async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(AppError::invalid_body(CHAT_FAILED))?;
    let request = ChatRequest {
        system: build_cothink_system_prompt(body.profile.as_ref()),
        messages: body.messages.iter().map(format_message).collect(),
        max_tokens: CHAT_MAX_TOKENS,
    };

    info!(turns = request.messages.len(), "Co-think chat turn");

    let deltas = state
        .chat_model
        .stream(&request)
        .await
        .map_err(AppError::upstream(CHAT_FAILED))?;

    Ok(relay(deltas).into_response())
}
