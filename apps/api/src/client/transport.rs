//! HTTP transport to a running Voice Builder server.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::chat::ChatBody;
use crate::client::ClientError;
use crate::illustration::handlers::IllustrationResponse;
use crate::models::{Platform, PlatformPersona};
use crate::notes::handlers::NoteCard;
use crate::sse::{self, DONE_SENTINEL};
use crate::transform::{TransformRequest, TransformResponse};

const REQUEST_TIMEOUT_SECS: u64 = 120;

pub type DeltaStream = BoxStream<'static, Result<String, ClientError>>;

/// The server routes the orchestrator and chat loop depend on.
#[async_trait]
pub trait VoiceApi: Send + Sync {
    async fn stream_transform(&self, request: &TransformRequest) -> Result<DeltaStream, ClientError>;
    async fn fetch_transform(&self, request: &TransformRequest) -> Result<String, ClientError>;
    async fn stream_chat(&self, body: &ChatBody) -> Result<DeltaStream, ClientError>;
}

#[derive(Debug, Deserialize)]
struct TextFrame {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, PartialEq)]
enum Frame {
    Text(String),
    Done,
}

/// `None` for payloads that are neither a text frame nor the sentinel.
fn parse_frame(payload: &str) -> Option<Frame> {
    if payload == DONE_SENTINEL {
        return Some(Frame::Done);
    }
    match serde_json::from_str::<TextFrame>(payload) {
        Ok(frame) => Some(Frame::Text(frame.text)),
        Err(e) => {
            debug!("Ignoring malformed frame: {e}");
            None
        }
    }
}

/// Decodes a relayed SSE body into its text deltas, ending at `[DONE]`.
///
/// The server drops the sentinel when the upstream fails mid-stream, so a
/// body that closes without it yields [`ClientError::Truncated`]. Nothing is
/// yielded after the first error.
pub fn text_deltas<S, E>(bytes: S) -> DeltaStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError> + Send + 'static,
{
    let payloads = sse::data_payloads(bytes);
    stream::unfold(Some(payloads), |payloads| async move {
        let mut payloads = payloads?;
        loop {
            match payloads.next().await {
                Some(Ok(payload)) => match parse_frame(&payload) {
                    Some(Frame::Text(text)) => return Some((Ok(text), Some(payloads))),
                    Some(Frame::Done) => return None,
                    None => continue,
                },
                Some(Err(e)) => return Some((Err(e.into()), None)),
                None => return Some((Err(ClientError::Truncated), None)),
            }
        }
    })
    .boxed()
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{path} returned {status}: {body}");
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    pub async fn extract_points(&self, content: &str) -> Result<NoteCard, ClientError> {
        let response = self
            .post("/api/extract-points", &json!({ "content": content }))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn generate_persona(
        &self,
        platform: Platform,
        answers: &[String],
    ) -> Result<PlatformPersona, ClientError> {
        let response = self
            .post(
                "/api/generate-persona",
                &json!({ "platform": platform, "answers": answers }),
            )
            .await?;
        Ok(response.json().await?)
    }

    pub async fn generate_illustration(
        &self,
        content: &str,
        custom_prompt: Option<&str>,
    ) -> Result<IllustrationResponse, ClientError> {
        let response = self
            .post(
                "/api/generate-anime-image",
                &json!({ "content": content, "customPrompt": custom_prompt }),
            )
            .await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VoiceApi for ApiClient {
    async fn stream_transform(&self, request: &TransformRequest) -> Result<DeltaStream, ClientError> {
        let request = TransformRequest {
            stream: true,
            ..request.clone()
        };
        let response = self.post("/api/transform", &request).await?;
        Ok(text_deltas(response.bytes_stream()))
    }

    async fn fetch_transform(&self, request: &TransformRequest) -> Result<String, ClientError> {
        let request = TransformRequest {
            stream: false,
            ..request.clone()
        };
        let response: TransformResponse = self.post("/api/transform", &request).await?.json().await?;
        Ok(response.result)
    }

    async fn stream_chat(&self, body: &ChatBody) -> Result<DeltaStream, ClientError> {
        let response = self.post("/api/chat", body).await?;
        Ok(text_deltas(response.bytes_stream()))
    }
}
