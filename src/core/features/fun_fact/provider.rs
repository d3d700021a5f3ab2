//! Text-generation backends for fun facts
//!
//! Both supported providers speak the same chat-completion protocol; they
//! differ only in default base URL and model name.

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::FunFactSettings;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 44;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Anything that can turn a system instruction plus a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> AppResult<String>;
}

/// Static description of a provider backend.
#[enum_dispatch]
pub trait ProviderProfile {
    fn name(&self) -> &'static str;
    fn default_base_url(&self) -> &'static str;
    fn default_model(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenRouter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenAi;

impl ProviderProfile for OpenRouter {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn default_base_url(&self) -> &'static str {
        "https://openrouter.ai/api/v1"
    }

    fn default_model(&self) -> &'static str {
        "openai/gpt-4o-mini"
    }
}

impl ProviderProfile for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn default_base_url(&self) -> &'static str {
        "https://api.openai.com/v1"
    }

    fn default_model(&self) -> &'static str {
        "gpt-4o-mini"
    }
}

/// The closed set of supported backends.
#[enum_dispatch(ProviderProfile)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactProvider {
    OpenRouter(OpenRouter),
    OpenAi(OpenAi),
}

impl FactProvider {
    /// `openai`, `chatgpt` and `gpt` select OpenAI; anything else is OpenRouter.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" | "gpt" => FactProvider::OpenAi(OpenAi),
            _ => FactProvider::OpenRouter(OpenRouter),
        }
    }
}

// -- Wire format --

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completion caller bound to one provider, key, base URL and model.
pub struct ChatCompletionClient {
    http: Client,
    provider: FactProvider,
    api_key: String,
    endpoint: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(
        provider: FactProvider,
        api_key: String,
        base_url: Option<&str>,
        model: Option<&str>,
    ) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("unitwise/fun-fact")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        let base = base_url.unwrap_or(provider.default_base_url());
        Ok(Self {
            http,
            provider,
            api_key,
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
            model: model.unwrap_or(provider.default_model()).to_string(),
        })
    }

    pub fn provider(&self) -> FactProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(&self, system: &str, prompt: &str) -> AppResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "{} returned {}",
                self.provider.name(),
                response.status()
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AppError::Upstream(format!("Invalid {} response: {}", self.provider.name(), e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                AppError::Upstream(format!("{} returned no usable text", self.provider.name()))
            })
    }
}

/// Build the configured generator. `None` when no API key is set.
pub fn build_generator(settings: &FunFactSettings) -> AppResult<Option<Arc<dyn TextGenerator>>> {
    let Some(api_key) = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    else {
        return Ok(None);
    };

    let provider = FactProvider::from_setting(&settings.provider);
    let client = ChatCompletionClient::new(
        provider,
        api_key.to_string(),
        settings.base_url.as_deref(),
        settings.model.as_deref(),
    )?;
    tracing::info!(provider = provider.name(), model = client.model(), "fun fact provider configured");
    Ok(Some(Arc::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_provider_selection() {
        assert_eq!(FactProvider::from_setting("openai"), FactProvider::OpenAi(OpenAi));
        assert_eq!(FactProvider::from_setting("ChatGPT"), FactProvider::OpenAi(OpenAi));
        assert_eq!(FactProvider::from_setting("gpt"), FactProvider::OpenAi(OpenAi));
        assert_eq!(
            FactProvider::from_setting("openrouter"),
            FactProvider::OpenRouter(OpenRouter)
        );
        assert_eq!(FactProvider::from_setting(""), FactProvider::OpenRouter(OpenRouter));
        assert_eq!(FactProvider::from_setting("claude"), FactProvider::OpenRouter(OpenRouter));
    }

    #[test]
    fn test_defaults_per_provider() {
        let client =
            ChatCompletionClient::new(FactProvider::from_setting("openai"), "k".into(), None, None)
                .unwrap();
        assert_eq!(client.endpoint, "https://api.openai.com/v1/chat/completions");
        assert_eq!(client.model(), "gpt-4o-mini");

        let client = ChatCompletionClient::new(
            FactProvider::from_setting("openrouter"),
            "k".into(),
            Some("http://localhost:9999/v1/"),
            Some("meta/llama"),
        )
        .unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/v1/chat/completions");
        assert_eq!(client.model(), "meta/llama");
    }

    #[test]
    fn test_no_key_means_no_generator() {
        let settings = FunFactSettings::default();
        assert!(build_generator(&settings).unwrap().is_none());

        let settings = FunFactSettings {
            api_key: Some("  ".into()),
            ..FunFactSettings::default()
        };
        assert!(build_generator(&settings).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_sends_chat_request_and_trims() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "openai/gpt-4o-mini",
                "max_tokens": 44,
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "tell me" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "  A fact.\n" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatCompletionClient::new(
            FactProvider::OpenRouter(OpenRouter),
            "sk-test".into(),
            Some(&format!("{}/v1", server.uri())),
            None,
        )
        .unwrap();

        let fact = client.generate("be brief", "tell me").await.unwrap();
        assert_eq!(fact, "A fact.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = ChatCompletionClient::new(
            FactProvider::OpenAi(OpenAi),
            "k".into(),
            Some(&server.uri()),
            None,
        )
        .unwrap();

        let err = client.generate("s", "p").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = ChatCompletionClient::new(
            FactProvider::OpenAi(OpenAi),
            "k".into(),
            Some(&server.uri()),
            None,
        )
        .unwrap();

        let err = client.generate("s", "p").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
