//! Shared Gemini payload types used across chat, image, and speech modules.

use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    /// A content block without a role, as used for single-shot prompts and
    /// system instructions.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

/// Untagged union of the content part kinds.
///
/// Variant order matters for `#[serde(untagged)]` decoding: anything that is
/// neither text nor inline data lands in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Other(serde_json::Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline_data(inline_data: InlineData) -> Self {
        Part::InlineData { inline_data }
    }
}

/// Base64 inline payload used for image and audio content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

impl InlineData {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate; empty when the response has none.
    pub fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or(&[])
    }
}

/// Candidate completion item returned by Gemini.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}
