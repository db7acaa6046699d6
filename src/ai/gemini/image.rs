use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::mime::{to_data_uri, DEFAULT_IMAGE_MIME};
use crate::ai::ImageGenerationService;
use crate::config::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
}

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self::new_with_client(config, reqwest::Client::new())
    }

    pub fn new_with_client(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(config, client),
        }
    }

    /// Picks the image out of the first candidate.
    ///
    /// Inline data wins; otherwise a text part is treated as a refusal.
    fn extract_image(response: &GenerateContentResponse) -> Result<String> {
        let parts = response.first_parts();

        let image = parts.iter().find_map(|p| match p {
            Part::InlineData { inline_data } if !inline_data.data.is_empty() => Some(inline_data),
            Part::InlineData { .. } | Part::Text { .. } | Part::Other(_) => None,
        });

        if let Some(image) = image {
            tracing::debug!(
                "Gemini returned image with mime_type: {}",
                image.mime_type
            );
            let mime_type = if image.mime_type.is_empty() {
                DEFAULT_IMAGE_MIME
            } else {
                image.mime_type.as_str()
            };
            return Ok(to_data_uri(mime_type, &image.data));
        }

        let refusal = parts.iter().find_map(|p| match p {
            Part::Text { text } if !text.is_empty() => Some(text),
            Part::Text { .. } | Part::InlineData { .. } | Part::Other(_) => None,
        });

        Err(match refusal {
            Some(text) => Error::ModelRefusal(text.clone()),
            None => Error::NoImageData,
        })
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let request = ImageRequest {
            contents: vec![Content::text(prompt)],
        };

        let response = self
            .http
            .generate_content(&self.http.config().image_model, &request, "Image", |_| {
                "Image generation failed.".to_string()
            })
            .await?;

        Self::extract_image(&response).map_err(|e| {
            tracing::error!("Gemini REST Image Error: {}", e);
            e
        })
    }
}
