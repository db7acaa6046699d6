//! AI service integration for text, image, and speech generation
//!
//! Each capability sits behind its own trait so callers can swap the Gemini
//! clients for the mocks in tests. [`GeminiService`] bundles all three clients
//! over one connection pool.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiChatClient, GeminiImageClient, GeminiSpeechClient};
pub use mock::{MockChatClient, MockImageGenerationClient, MockSpeechClient};

use crate::config::Config;
use crate::models::TextRequest;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Returns the model's reply, or a fixed fallback sentence when the
    /// response carries no text.
    async fn generate_text_response(&self, request: &TextRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Returns the image as a `data:{mime};base64,...` URI.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Returns base64 audio. `None` uses the configured default voice.
    async fn generate_speech(&self, text: &str, voice_name: Option<&str>) -> Result<String>;
}

/// Text, image, and speech clients sharing one config and HTTP pool.
pub struct GeminiService {
    config: Arc<Config>,
    chat: GeminiChatClient,
    image: GeminiImageClient,
    speech: GeminiSpeechClient,
}

impl GeminiService {
    pub fn new(config: Config) -> Self {
        Self::new_with_client(config, reqwest::Client::new())
    }

    pub fn new_with_client(config: Config, client: reqwest::Client) -> Self {
        let config = Arc::new(config);
        Self {
            chat: GeminiChatClient::new_with_client(config.clone(), client.clone()),
            image: GeminiImageClient::new_with_client(config.clone(), client.clone()),
            speech: GeminiSpeechClient::new_with_client(config.clone(), client),
            config,
        }
    }

    /// Resolves the API key from the environment and builds the clients.
    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn generate_text_response(&self, request: &TextRequest) -> Result<String> {
        self.chat.generate_text_response(request).await
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.image.generate_image(prompt).await
    }

    pub async fn generate_speech(&self, text: &str, voice_name: Option<&str>) -> Result<String> {
        self.speech.generate_speech(text, voice_name).await
    }

    /// Splits the bundle into boxed trait objects.
    pub fn into_services(
        self,
    ) -> (
        Box<dyn ChatService>,
        Box<dyn ImageGenerationService>,
        Box<dyn SpeechService>,
    ) {
        (
            Box::new(self.chat),
            Box::new(self.image),
            Box::new(self.speech),
        )
    }
}
