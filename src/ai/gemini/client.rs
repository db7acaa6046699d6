use super::types::{ErrorResponse, GenerateContentResponse};
use crate::config::Config;
use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// Lightweight Gemini REST client shared by the chat, image, and speech modules.
#[derive(Clone)]
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    pub(crate) config: Arc<Config>,
}

impl GeminiHttpClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: Arc<Config>, client: Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fails with [`Error::CredentialMissing`] when no API key was resolved.
    pub fn require_api_key(&self, operation: &str) -> Result<()> {
        if self.config.has_api_key() {
            Ok(())
        } else {
            let err = Error::CredentialMissing;
            tracing::error!("Gemini REST {} Error: {}", operation, err);
            Err(err)
        }
    }

    /// `{base_url}/models/{model}:generateContent`, without the key query.
    ///
    /// `model` may be given with or without a `models/` prefix.
    pub fn generate_content_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:generateContent", self.config.base_url, model)
    }

    /// Calls Gemini's `generateContent` endpoint for `model`.
    ///
    /// On a non-success status the server's `error.message` is surfaced as
    /// [`Error::Api`], or `fallback_message` when the body carries none.
    pub async fn generate_content<Req: Serialize>(
        &self,
        model: &str,
        request: &Req,
        operation: &str,
        fallback_message: impl FnOnce(StatusCode) -> String,
    ) -> Result<GenerateContentResponse> {
        self.require_api_key(operation)?;

        let url = self.generate_content_url(model);
        tracing::debug!("Sending {} request to Gemini model {}", operation, model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| transport_error(operation, e))?;
            let message = server_error_message(&body).unwrap_or_else(|| fallback_message(status));
            let err = Error::Api {
                status: status.as_u16(),
                message,
            };
            tracing::error!(
                "Gemini REST {} Error (status {}): {}",
                operation,
                status,
                err
            );
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation, e))?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                "Gemini REST {} Error: failed to parse response: {}\nBody: {}",
                operation,
                e,
                body
            );
            Error::Serialization(e)
        })
    }
}

/// Logs a send or body-read failure and strips the URL, which carries the key.
fn transport_error(operation: &str, e: reqwest::Error) -> reqwest::Error {
    let e = e.without_url();
    tracing::error!("Gemini REST {} Error: {}", operation, e);
    e
}

/// `error.message` from a Gemini error body, if it has a non-empty one.
fn server_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty())
}

/// `"API Error: {reason}"` using the canonical reason phrase for `status`.
pub fn status_text_message(status: StatusCode) -> String {
    format!(
        "API Error: {}",
        status.canonical_reason().unwrap_or(status.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tracing_test::traced_test;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer, api_key: &str) -> GeminiHttpClient {
        GeminiHttpClient::new(Arc::new(test_support::config_for(server, api_key)))
    }

    #[test]
    fn test_server_error_message() {
        assert_eq!(
            server_error_message(r#"{"error":{"message":"quota exceeded"}}"#),
            Some("quota exceeded".to_string())
        );
        assert_eq!(server_error_message(r#"{"error":{"message":""}}"#), None);
        assert_eq!(server_error_message(r#"{"error":{}}"#), None);
        assert_eq!(server_error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_status_text_message() {
        assert_eq!(
            status_text_message(StatusCode::INTERNAL_SERVER_ERROR),
            "API Error: Internal Server Error"
        );
    }

    #[test]
    fn test_url_strips_models_prefix() {
        let client = GeminiHttpClient::new(Arc::new(
            Config::with_api_key("k").with_base_url("http://host/v1beta"),
        ));
        assert_eq!(
            client.generate_content_url("models/gemini-2.5-flash"),
            "http://host/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_sends_key_as_query_param_with_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(header("content-type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");
        let response = client
            .generate_content(
                "gemini-2.5-flash",
                &serde_json::json!({ "contents": [] }),
                "Text",
                status_text_message,
            )
            .await
            .unwrap();

        assert!(response.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = make_client(&server, "");
        let err = client
            .generate_content(
                "gemini-2.5-flash",
                &serde_json::json!({}),
                "Text",
                status_text_message,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CredentialMissing));
    }

    #[tokio::test]
    async fn test_non_json_error_body_uses_fallback() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");
        let err = client
            .generate_content(
                "gemini-2.5-flash",
                &serde_json::json!({}),
                "Text",
                status_text_message,
            )
            .await
            .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "API Error: Service Unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_serialization_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");
        let err = client
            .generate_content(
                "gemini-2.5-flash",
                &serde_json::json!({}),
                "Text",
                status_text_message,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Serialization(_)));
    }

    /// Serves one request, answering with `head` and `body` then closing.
    async fn serve_once(head: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/v1beta", addr)
    }

    #[tokio::test]
    #[traced_test]
    async fn test_truncated_error_body_is_logged() {
        let base_url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Type: application/json\r\nContent-Length: 100\r\nConnection: close\r\n\r\n",
            "{\"error\":",
        )
        .await;
        let client = GeminiHttpClient::new(Arc::new(
            Config::with_api_key("secret-key").with_base_url(base_url),
        ));

        let err = client
            .generate_content(
                "gemini-2.5-flash",
                &serde_json::json!({}),
                "Text",
                status_text_message,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
        assert!(!err.to_string().contains("secret-key"));
        assert!(logs_contain("Gemini REST Text Error"));
        assert!(!logs_contain("secret-key"));
    }
}
