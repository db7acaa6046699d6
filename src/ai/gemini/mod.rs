pub mod chat;
pub mod client;
pub mod image;
pub mod speech;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat::GeminiChatClient;
pub use client::GeminiHttpClient;
pub use image::GeminiImageClient;
pub use speech::GeminiSpeechClient;
