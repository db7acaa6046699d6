use super::mime::to_data_uri;
use super::{ChatService, ImageGenerationService, SpeechService};
use crate::models::TextRequest;
use crate::Result;
use async_trait::async_trait;
use base64::Engine as _;
use std::sync::{Arc, Mutex, MutexGuard};

/// Smallest valid PNG (1x1 pixel).
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
    0x44, 0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2,
    0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cycles through configured responses, or falls back to `default`.
fn next_response(
    responses: &Mutex<Vec<String>>,
    call_count: &Mutex<usize>,
    default: impl FnOnce() -> String,
) -> String {
    let mut count = lock(call_count);
    *count += 1;

    let responses = lock(responses);
    if responses.is_empty() {
        default()
    } else {
        let index = (*count - 1) % responses.len();
        responses[index].clone()
    }
}

#[derive(Default)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<TextRequest>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: String) -> Self {
        lock(&self.responses).push(response);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<TextRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn generate_text_response(&self, request: &TextRequest) -> Result<String> {
        lock(&self.requests).push(request.clone());
        Ok(next_response(&self.responses, &self.call_count, || {
            format!("Mock reply to: {}", request.prompt)
        }))
    }
}

#[derive(Default)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a data URI to return.
    pub fn with_image_response(self, data_uri: String) -> Self {
        lock(&self.responses).push(data_uri);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *lock(&self.call_count)
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, _prompt: &str) -> Result<String> {
        Ok(next_response(&self.responses, &self.call_count, || {
            let data = base64::engine::general_purpose::STANDARD.encode(TINY_PNG);
            to_data_uri("image/png", &data)
        }))
    }
}

#[derive(Default)]
pub struct MockSpeechClient {
    responses: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    voices: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockSpeechClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a base64 audio payload to return.
    pub fn with_audio_response(self, base64_audio: String) -> Self {
        lock(&self.responses).push(base64_audio);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Voice argument of every call so far.
    pub fn voices(&self) -> Vec<Option<String>> {
        lock(&self.voices).clone()
    }
}

#[async_trait]
impl SpeechService for MockSpeechClient {
    async fn generate_speech(&self, _text: &str, voice_name: Option<&str>) -> Result<String> {
        lock(&self.voices).push(voice_name.map(str::to_string));
        Ok(next_response(&self.responses, &self.call_count, || {
            // 100ms of 16-bit mono silence at 24kHz.
            base64::engine::general_purpose::STANDARD.encode(vec![0u8; 4800])
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mime::parse_data_uri;

    #[tokio::test]
    async fn test_mock_chat_default_reply() {
        let client = MockChatClient::new();

        let reply = client
            .generate_text_response(&TextRequest::new("apple"))
            .await
            .unwrap();
        assert!(reply.contains("apple"));
        assert_eq!(client.requests()[0].prompt, "apple");
    }

    #[tokio::test]
    async fn test_mock_chat_custom_responses_cycle() {
        let client = MockChatClient::new()
            .with_response("first".to_string())
            .with_response("second".to_string());
        let request = TextRequest::new("x");

        assert_eq!(client.generate_text_response(&request).await.unwrap(), "first");
        assert_eq!(client.generate_text_response(&request).await.unwrap(), "second");
        // Should cycle back
        assert_eq!(client.generate_text_response(&request).await.unwrap(), "first");
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_image_default_is_png_data_uri() {
        let client = MockImageGenerationClient::new();

        let uri = client.generate_image("test").await.unwrap();
        let (mime_type, data) = parse_data_uri(&uri).unwrap();
        assert_eq!(mime_type, "image/png");

        let bytes = base64::engine::general_purpose::STANDARD.decode(data).unwrap();
        assert_eq!(bytes, TINY_PNG);
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_speech_records_voice() {
        let client = MockSpeechClient::new().with_audio_response("AAAA".to_string());

        assert_eq!(client.generate_speech("hi", Some("Puck")).await.unwrap(), "AAAA");
        client.generate_speech("hi", None).await.unwrap();

        assert_eq!(client.voices(), vec![Some("Puck".to_string()), None]);
        assert_eq!(client.get_call_count(), 2);
    }
}
