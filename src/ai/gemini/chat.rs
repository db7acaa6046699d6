use super::client::{status_text_message, GeminiHttpClient};
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::ChatService;
use crate::config::Config;
use crate::models::{HistoryTurn, TextRequest};
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Returned when a successful response carries no text.
pub const NO_RESPONSE_FALLBACK: &str = "I couldn't generate a response.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    contents: Vec<Content>,
    generation_config: ChatGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatGenerationConfig {
    max_output_tokens: u32,
}

pub struct GeminiChatClient {
    http: GeminiHttpClient,
}

impl GeminiChatClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self::new_with_client(config, reqwest::Client::new())
    }

    pub fn new_with_client(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(config, client),
        }
    }

    fn build_request(&self, request: &TextRequest) -> ChatRequest {
        let mut contents = history_to_contents(&request.history);

        let mut current_parts: Vec<Part> = request
            .image_parts
            .iter()
            .cloned()
            .map(Part::inline_data)
            .collect();
        current_parts.push(Part::text(request.prompt.as_str()));
        contents.push(Content::user(current_parts));

        ChatRequest {
            contents,
            generation_config: ChatGenerationConfig {
                max_output_tokens: self.http.config().max_output_tokens,
            },
            system_instruction: request
                .system_instruction
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Content::text),
        }
    }

    /// Text of the first part of the first candidate, if it has any.
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        match response.first_parts().first() {
            Some(Part::Text { text }) if !text.is_empty() => Some(text.clone()),
            Some(Part::Text { .. } | Part::InlineData { .. } | Part::Other(_)) | None => None,
        }
    }
}

/// Maps caller history into wire turns.
///
/// Roles other than `"model"` become `"user"`, blank text parts are dropped,
/// and turns left without parts are dropped.
fn history_to_contents(history: &[HistoryTurn]) -> Vec<Content> {
    history
        .iter()
        .map(|turn| Content {
            role: Some(if turn.role == "model" { "model" } else { "user" }.to_string()),
            parts: turn
                .parts
                .iter()
                .filter(|p| !p.text.trim().is_empty())
                .map(|p| Part::text(p.text.as_str()))
                .collect(),
        })
        .filter(|content| !content.parts.is_empty())
        .collect()
}

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn generate_text_response(&self, request: &TextRequest) -> Result<String> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(self.http.config().text_model.as_str());

        let body = self.build_request(request);
        let response = self
            .http
            .generate_content(model, &body, "Text", status_text_message)
            .await?;

        Ok(Self::extract_text(&response).unwrap_or_else(|| {
            tracing::debug!(
                "Gemini text response had no text part (finish reason: {}), using fallback",
                response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("none")
            );
            NO_RESPONSE_FALLBACK.to_string()
        }))
    }
}
