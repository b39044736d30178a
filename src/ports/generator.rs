//! Chat-completions generator for OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GeneratorError, GeneratorPort, Role};

const DEFAULT_TEMPERATURE: f32 = 0.1;

/// [`GeneratorPort`] backed by an OpenAI-compatible chat-completions API.
///
/// Each call sends the role's instruction set as the system message and the
/// caller's context as the user message. No request deadline is applied
/// beyond the transport's own behavior; generation latency is unbounded by
/// design (callers wanting a ceiling should wrap the call in a timeout).
///
/// # Examples
///
/// ```rust,no_run
/// use terramend::ports::OpenAiGenerator;
///
/// let generator = OpenAiGenerator::new(
///     "https://api.openai.com/v1",
///     std::env::var("OPENAI_API_KEY").unwrap_or_default(),
///     "gpt-4o-mini",
/// );
/// ```
#[derive(Clone, Debug)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    /// Creates a generator against `endpoint` (the API base URL, without the
    /// `/chat/completions` suffix).
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl GeneratorPort for OpenAiGenerator {
    async fn generate(&self, role: Role, context: &str) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: role.instructions(),
                },
                ChatMessage {
                    role: "user",
                    content: context,
                },
            ],
        };

        tracing::debug!(role = %role, "sending generation request");
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(GeneratorError::EmptyCompletion)?;
        Ok(choice.message.content)
    }
}
