use std::time::Duration;

use async_trait::async_trait;
use parley_core::{ChatCompletion, ChatRequest, LLMProvider};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Longest slice of an error body kept in `ProviderError::Status`.
const ERROR_BODY_LIMIT: usize = 500;

/// Client for Groq's OpenAI-compatible chat completions endpoint.
///
/// Any other OpenAI-compatible server works through `with_base_url`.
pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GroqProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating GroqProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Rebuild the HTTP client with a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ProviderError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    async fn try_send(&self, request: &ChatRequest) -> Result<ChatCompletion, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ProviderError::Decode)
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatCompletion> {
        info!(
            "Sending request to chat completions API: model={}, messages={}, functions={}",
            request.model,
            request.messages.len(),
            request.functions.as_ref().map_or(0, Vec::len)
        );

        let completion = self.try_send(request).await?;

        if let Some(usage) = completion.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!(
            "Received response from chat completions API: choices={}",
            completion.choices.len()
        );
        Ok(completion)
    }

    fn get_default_model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{ChatMessage, FunctionDefinition};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest::new(DEFAULT_MODEL, vec![ChatMessage::user("hello")]).with_max_tokens(16)
    }

    fn provider_for(server: &MockServer) -> GroqProvider {
        GroqProvider::new("test-key".to_string()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn decodes_successful_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": DEFAULT_MODEL, "max_tokens": 16})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi there"}}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let completion = provider.chat(&request()).await.unwrap();

        assert_eq!(completion.first_content(), "hi there");
        assert_eq!(completion.usage.unwrap().total_tokens, 5);
    }

    #[tokio::test]
    async fn sends_forced_function_directive() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"function_call": {"name": "lookup"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .expect(1)
            .mount(&server)
            .await;

        let function = FunctionDefinition {
            name: "lookup".to_string(),
            description: "look something up".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        };
        let provider = provider_for(&server);
        let completion = provider
            .chat(&request().with_forced_function(function))
            .await
            .unwrap();

        assert!(completion.choices.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_is_reported_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.chat(&request()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn server_error_keeps_truncated_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(2000)))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.chat(&request()).await.unwrap_err();

        match err.downcast_ref::<ProviderError>() {
            Some(ProviderError::Status { status, body }) => {
                assert_eq!(*status, 503);
                assert_eq!(body.len(), ERROR_BODY_LIMIT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.chat(&request()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = GroqProvider::new("k".to_string())
            .with_base_url("http://localhost:1234/v1/".to_string())
            .with_model("m".to_string());
        assert_eq!(provider.base_url, "http://localhost:1234/v1");
        assert_eq!(provider.get_default_model(), "m");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider = GroqProvider::new("gsk_secret".to_string());
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains(DEFAULT_MODEL));
    }
}
