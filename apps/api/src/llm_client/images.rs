//! Image generation backend (OpenAI Images API).
//!
//! Same rule as the text client: nothing else calls OpenAI directly.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::{api_error_message, LlmError};

const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
pub const IMAGE_MODEL: &str = "dall-e-3";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Square line-art illustrations do not benefit from HD or vivid rendering.
const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";
const IMAGE_STYLE: &str = "natural";

/// A hosted image generator. Returns base64 PNG data, or `None` when the
/// service answered without any image.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError>;
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    api_key: String,
}

impl ImageClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl ImageModel for ImageClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let body = ImageRequest {
            model: IMAGE_MODEL,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            style: IMAGE_STYLE,
            response_format: "b64_json",
        };

        let response = self
            .client
            .post(OPENAI_IMAGES_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Image API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let response: ImageResponse = response.json().await?;
        debug!("Image API returned {} item(s)", response.data.len());

        Ok(first_image(response))
    }
}

fn first_image(response: ImageResponse) -> Option<String> {
    response.data.into_iter().next().and_then(|d| d.b64_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_image_present() {
        let response: ImageResponse =
            serde_json::from_str(r#"{"created": 1, "data": [{"b64_json": "iVBOR"}]}"#).unwrap();
        assert_eq!(first_image(response), Some("iVBOR".to_string()));
    }

    #[test]
    fn test_first_image_missing() {
        let empty: ImageResponse = serde_json::from_str(r#"{"created": 1}"#).unwrap();
        assert_eq!(first_image(empty), None);

        let url_only: ImageResponse =
            serde_json::from_str(r#"{"data": [{"url": "https://example.com/x.png"}]}"#).unwrap();
        assert_eq!(first_image(url_only), None);
    }

    #[test]
    fn test_request_shape() {
        let body = ImageRequest {
            model: IMAGE_MODEL,
            prompt: "a stick figure",
            n: 1,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            style: IMAGE_STYLE,
            response_format: "b64_json",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "dall-e-3");
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["response_format"], "b64_json");
    }
}
