//! Command-line front end over the text, image, and speech services.

use crate::ai::gemini::types::InlineData;
use crate::ai::mime::{detect_image_mime, extension_for_mime, parse_data_uri};
use crate::ai::{
    ChatService, GeminiService, ImageGenerationService, MockChatClient,
    MockImageGenerationClient, MockSpeechClient, SpeechService,
};
use crate::config::Config;
use crate::models::{HistoryTurn, TextRequest};
use crate::Result;
use base64::Engine as _;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub struct App {
    chat: Box<dyn ChatService>,
    image_gen: Box<dyn ImageGenerationService>,
    speech: Box<dyn SpeechService>,
    output_dir: PathBuf,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Box<dyn ChatService>,
    pub image_gen: Box<dyn ImageGenerationService>,
    pub speech: Box<dyn SpeechService>,
}

impl App {
    pub fn with_services(services: AppServices, output_dir: PathBuf) -> Self {
        Self {
            chat: services.chat,
            image_gen: services.image_gen,
            speech: services.speech,
            output_dir,
        }
    }

    /// Gemini-backed app, or mocks when `config.dry_run` is set.
    pub fn new(config: Config, output_dir: PathBuf) -> Self {
        let services = if config.dry_run {
            info!("DRY_RUN enabled, using mock services");
            AppServices {
                chat: Box::new(MockChatClient::new()),
                image_gen: Box::new(MockImageGenerationClient::new()),
                speech: Box::new(MockSpeechClient::new()),
            }
        } else {
            info!(
                "Using Gemini at {} (text: {}, image: {}, speech: {})",
                config.base_url, config.text_model, config.image_model, config.speech_model
            );
            let (chat, image_gen, speech) = GeminiService::new(config).into_services();
            AppServices {
                chat,
                image_gen,
                speech,
            }
        };

        Self::with_services(services, output_dir)
    }

    pub async fn text(&self, request: &TextRequest) -> Result<String> {
        self.chat.generate_text_response(request).await
    }

    /// Generates an image and writes the decoded bytes to `out`, or to a
    /// fresh file under the output directory.
    pub async fn image(&self, prompt: &str, out: Option<&Path>) -> Result<PathBuf> {
        let data_uri = self.image_gen.generate_image(prompt).await?;
        let (mime_type, data) = parse_data_uri(&data_uri)?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(data)?;

        let path = match out {
            Some(path) => path.to_path_buf(),
            None => self.default_path("image", extension_for_mime(mime_type)),
        };
        write_output(&path, &bytes).await?;

        info!("Wrote {} image ({} bytes) to {}", mime_type, bytes.len(), path.display());
        Ok(path)
    }

    /// Generates speech and writes the decoded audio bytes as-is.
    pub async fn speech(
        &self,
        text: &str,
        voice_name: Option<&str>,
        out: Option<&Path>,
    ) -> Result<PathBuf> {
        let audio = self.speech.generate_speech(text, voice_name).await?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(audio)?;

        let path = match out {
            Some(path) => path.to_path_buf(),
            None => self.default_path("speech", "pcm"),
        };
        write_output(&path, &bytes).await?;

        info!("Wrote audio ({} bytes) to {}", bytes.len(), path.display());
        Ok(path)
    }

    fn default_path(&self, kind: &str, extension: &str) -> PathBuf {
        let date = Local::now().format("%Y-%m-%d");
        self.output_dir
            .join(format!("{}_{}_{}.{}", kind, date, Uuid::new_v4(), extension))
    }
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Reads an image file into an inline part, sniffing its MIME type.
pub async fn load_image_part(path: &Path) -> Result<InlineData> {
    let bytes = tokio::fs::read(path).await?;
    let mime_type = detect_image_mime(&bytes);
    Ok(InlineData::new(
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(&bytes),
    ))
}

/// Reads a JSON array of `{role, parts: [{text}]}` turns.
pub async fn load_history(path: &Path) -> Result<Vec<HistoryTurn>> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}
