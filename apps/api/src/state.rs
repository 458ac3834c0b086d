use std::sync::Arc;

use crate::llm_client::images::ImageModel;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text model backend. Default: `LlmClient` (Anthropic).
    pub chat_model: Arc<dyn ChatModel>,
    /// Image backend; `None` when `OPENAI_API_KEY` is not set.
    pub image_model: Option<Arc<dyn ImageModel>>,
}
