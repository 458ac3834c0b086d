use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The web client only understands a flat `{"error": "..."}` body, so every
/// variant collapses to a route-specific generic message; the cause is logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("{message}: {source}")]
    InvalidBody {
        message: &'static str,
        #[source]
        source: JsonRejection,
    },

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Image generation failed: {details}")]
    ImageGeneration {
        details: String,
        prompt: Option<String>,
        highlight: Option<String>,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wraps an LLM failure with the generic message its route reports.
    pub fn upstream(message: &'static str) -> impl FnOnce(LlmError) -> AppError {
        move |source| AppError::Upstream { message, source }
    }

    /// Wraps a body that failed to parse with the generic message its route reports.
    pub fn invalid_body(message: &'static str) -> impl FnOnce(JsonRejection) -> AppError {
        move |source| AppError::InvalidBody { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body: Value = match self {
            AppError::Upstream { message, source } => {
                tracing::error!("{message}: {source}");
                json!({ "error": message })
            }
            AppError::InvalidBody { message, source } => {
                tracing::error!("{message}: {}", source.body_text());
                json!({ "error": message })
            }
            AppError::NotConfigured(message) => {
                tracing::error!("Not configured: {message}");
                json!({ "error": message })
            }
            AppError::ImageGeneration {
                details,
                prompt,
                highlight,
            } => {
                tracing::error!("Image generation failed: {details}");
                let mut body = json!({
                    "error": "Failed to generate image",
                    "details": details,
                });
                if let Some(prompt) = prompt {
                    body["prompt"] = Value::String(prompt);
                }
                if let Some(highlight) = highlight {
                    body["highlight"] = Value::String(highlight);
                }
                body
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                json!({ "error": "An internal server error occurred" })
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upstream_error_is_flat_and_generic() {
        let error = AppError::upstream("Failed to transform content")(LlmError::Api {
            status: 401,
            message: "invalid x-api-key".to_string(),
        });
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to transform content" }));
    }

    #[tokio::test]
    async fn test_not_configured_error() {
        let (status, body) = body_json(AppError::NotConfigured("OPENAI_API_KEY not configured")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "OPENAI_API_KEY not configured");
    }

    #[tokio::test]
    async fn test_image_generation_error_carries_details() {
        let (_, body) = body_json(AppError::ImageGeneration {
            details: "DALL-E did not return image data".to_string(),
            prompt: Some("p".to_string()),
            highlight: None,
        })
        .await;
        assert_eq!(body["error"], "Failed to generate image");
        assert_eq!(body["details"], "DALL-E did not return image data");
        assert_eq!(body["prompt"], "p");
        assert!(body.get("highlight").is_none());
    }
}
