//! Gemini text-to-speech client.
//!
//! Returns the raw base64 audio payload. Unlike images, the result is not
//! wrapped in a `data:` URI.

use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::SpeechService;
use crate::config::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct SpeechRequest {
    contents: Vec<Content>,
    config: SpeechGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechGenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

pub struct GeminiSpeechClient {
    http: GeminiHttpClient,
}

impl GeminiSpeechClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self::new_with_client(config, reqwest::Client::new())
    }

    pub fn new_with_client(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(config, client),
        }
    }

    fn build_request(text: &str, voice_name: &str) -> SpeechRequest {
        SpeechRequest {
            contents: vec![Content::text(text)],
            config: SpeechGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice_name.to_string(),
                        },
                    },
                },
            },
        }
    }

    /// Audio payload of the first part of the first candidate.
    fn extract_audio(response: &GenerateContentResponse) -> Result<String> {
        match response.first_parts().first() {
            Some(Part::InlineData { inline_data }) if !inline_data.data.is_empty() => {
                Ok(inline_data.data.clone())
            }
            Some(Part::InlineData { .. } | Part::Text { .. } | Part::Other(_)) | None => {
                Err(Error::NoAudioData)
            }
        }
    }
}

#[async_trait]
impl SpeechService for GeminiSpeechClient {
    async fn generate_speech(&self, text: &str, voice_name: Option<&str>) -> Result<String> {
        let config = self.http.config();
        let voice_name = voice_name.unwrap_or(config.default_voice.as_str());
        let request = Self::build_request(text, voice_name);

        let response = self
            .http
            .generate_content(&config.speech_model, &request, "TTS", |_| {
                "TTS generation failed".to_string()
            })
            .await?;

        Self::extract_audio(&response).map_err(|e| {
            tracing::error!("Gemini REST TTS Error: {}", e);
            e
        })
    }
}
