//! Thin client for the Gemini `generateContent` REST API
//!
//! Forwards text, image, and speech generation requests, resolving the API
//! key from the environment once per [`Config`].

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod models;

pub use ai::{ChatService, GeminiService, ImageGenerationService, SpeechService};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{HistoryTurn, TextPart, TextRequest};
