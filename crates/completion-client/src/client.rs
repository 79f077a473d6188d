use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::types::{ChatMessage, Completion, CompletionRequest, CompletionResponse};
use crate::CompletionError;

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 4096;

/// Which completion backend to talk to. Both speak the OpenAI wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Groq,
    OpenAi,
}

impl Provider {
    /// Reads `SCOUT_COMPLETION_PROVIDER`; anything other than "openai"
    /// selects Groq.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("SCOUT_COMPLETION_PROVIDER").ok().as_deref() {
            Some("openai") => Self::OpenAi,
            _ => Self::Groq,
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Groq => "llama-3.3-70b-versatile",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Self::Groq => GROQ_ENDPOINT,
            Self::OpenAi => OPENAI_ENDPOINT,
        }
    }

    fn key_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Self::Groq => "Set GROQ_API_KEY to enable Groq completions",
            Self::OpenAi => "Set OPENAI_API_KEY to enable OpenAI completions",
        }
    }
}

pub struct CompletionClient {
    http: Client,
    provider: Provider,
    endpoint: Option<String>,
}

impl CompletionClient {
    /// Builds a client for the given provider. Credentials are checked per
    /// call, not here, so construction always succeeds.
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        let http = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build reqwest client");
        Self {
            http,
            provider,
            endpoint: None,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(Provider::from_env())
    }

    /// Points the client at a different chat-completions URL. For tests and
    /// self-hosted OpenAI-compatible backends.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.endpoint())
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// The API key for the active provider, if configured.
    fn credentials(&self) -> Result<String, CompletionError> {
        std::env::var(self.provider.key_var())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CompletionError::MissingCredentials {
                provider: self.provider,
                hint: self.provider.hint(),
            })
    }

    /// One chat completion round trip. The system message, when present,
    /// must already be first in `messages`.
    #[instrument(name = "completion.complete", skip(self, messages))]
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<String>,
    ) -> Result<Completion, CompletionError> {
        let key = self.credentials()?;
        let model = model.unwrap_or_else(|| self.provider.default_model().to_string());

        let request = CompletionRequest {
            model: model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %body, "completion request rejected");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let decoded = response
            .json::<CompletionResponse>()
            .await
            .map_err(CompletionError::Transport)?;

        let text = decoded
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::Malformed)?;

        Ok(Completion {
            text,
            model,
            usage: decoded.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groq_is_the_default_provider() {
        assert_eq!(Provider::default(), Provider::Groq);
        assert_eq!(Provider::Groq.default_model(), "llama-3.3-70b-versatile");
        assert_eq!(Provider::OpenAi.default_model(), "gpt-4o-mini");
    }

    #[test]
    fn endpoint_override_replaces_the_provider_url() {
        let client = CompletionClient::new(Provider::Groq);
        assert_eq!(client.endpoint(), GROQ_ENDPOINT);

        let client = client.with_endpoint("http://127.0.0.1:9/v1/chat/completions");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn hints_name_the_env_var() {
        assert!(Provider::Groq.hint().contains("GROQ_API_KEY"));
        assert!(Provider::OpenAi.hint().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn empty_choices_decode_to_malformed() {
        let decoded: CompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).expect("decode");
        assert!(decoded.choices.is_empty());
    }

    #[test]
    fn usage_decodes_when_present() {
        let decoded: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "hello"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
            }"#,
        )
        .expect("decode");
        let usage = decoded.usage.expect("usage");
        assert_eq!(usage.total_tokens, 16);
    }
}
