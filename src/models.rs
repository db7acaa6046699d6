//! Data models and structures
//!
//! The simplified call shapes callers hand to the text operation. They are
//! translated into Gemini wire types by the chat client.

use crate::ai::gemini::types::InlineData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

/// One prior message of a conversation.
///
/// Any role other than `"model"` is sent as `"user"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: String,
    pub parts: Vec<TextPart>,
}

impl HistoryTurn {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![TextPart { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new("model", text)
    }
}

/// Arguments of a text generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRequest {
    pub history: Vec<HistoryTurn>,
    pub prompt: String,
    /// Inline images attached ahead of the prompt in the final user turn.
    pub image_parts: Vec<InlineData>,
    /// Overrides the configured text model.
    pub model: Option<String>,
    pub system_instruction: Option<String>,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_image(mut self, image: InlineData) -> Self {
        self.image_parts.push(image);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}
