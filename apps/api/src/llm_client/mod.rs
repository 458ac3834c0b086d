/// LLM Client — the single point of entry for all Claude API calls in Voice Builder.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Route handlers talk to `dyn ChatModel`; `LlmClient` is the production backend.
///
/// Model: claude-sonnet-4-20250514 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Role;
use crate::sse;

pub mod images;
pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all text calls in Voice Builder.
pub const MODEL: &str = "claude-sonnet-4-20250514";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("LLM reply contained no JSON object")]
    NoJsonObject,
}

// ────────────────────────────────────────────────────────────────────────────
// Request model (provider-neutral)
// ────────────────────────────────────────────────────────────────────────────

/// One call to a chat model: system prompt, turns, and output budget.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// A single user turn, as used by every route except chat.
    pub fn single_turn(system: impl Into<String>, content: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: MessageContent::Text(content.into()),
            }],
            max_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// Plain text, or multi-part content when an image is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: &'static str,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source_type: "base64",
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

/// Text deltas in arrival order.
pub type TextStream = BoxStream<'static, Result<String, LlmError>>;

/// A hosted chat model. Carried in `AppState` as `Arc<dyn ChatModel>` so
/// handlers can be exercised against a fake backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Awaits the full completion and returns its text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Opens a streaming completion. Errors before the first byte are returned
    /// directly; later failures surface as an `Err` item in the stream.
    async fn stream(&self, request: &ChatRequest) -> Result<TextStream, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Text of the first content block, if it is a text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .first()
            .filter(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    Error { error: AnthropicErrorBody },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The Anthropic Messages API backend. No automatic retries: every failure is
/// terminal for the request that hit it.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
        })
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response, LlmError> {
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: &request.messages,
            stream,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response: LlmResponse = self.send(request, false).await?.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            response.usage.input_tokens, response.usage.output_tokens
        );

        Ok(response.text().unwrap_or_default().to_string())
    }

    async fn stream(&self, request: &ChatRequest) -> Result<TextStream, LlmError> {
        let response = self.send(request, true).await?;

        let deltas = sse::data_payloads(response.bytes_stream()).filter_map(|payload| {
            futures::future::ready(match payload {
                Ok(payload) => text_delta(&payload),
                Err(e) => Some(Err(LlmError::Http(e))),
            })
        });

        Ok(deltas.boxed())
    }
}

/// Extracts the message from an Anthropic-style `{"error": {"message": ...}}`
/// body, falling back to the raw body.
pub(crate) fn api_error_message(body: String) -> String {
    serde_json::from_str::<AnthropicError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Maps one upstream stream event to a text delta. Events we do not care about
/// and malformed payloads yield `None`.
fn text_delta(payload: &str) -> Option<Result<String, LlmError>> {
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(StreamEvent::ContentBlockDelta {
            delta: Delta::TextDelta { text },
        }) => Some(Ok(text)),
        Ok(StreamEvent::Error { error }) => Some(Err(LlmError::Stream(error.message))),
        Ok(_) => None,
        Err(e) => {
            debug!("Ignoring unparseable stream event: {e}");
            None
        }
    }
}

/// Returns the outermost `{ ... }` span of an LLM reply: from the first `{`
/// to the last `}`. Models often wrap JSON in prose or code fences.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses the JSON object embedded in an LLM reply.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let json = extract_json_object(text).ok_or(LlmError::NoJsonObject)?;
    serde_json::from_str(json).map_err(LlmError::Parse)
}
