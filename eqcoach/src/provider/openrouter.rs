//! OpenRouter adapter (secondary provider), OpenAI-compatible chat API.
//!
//! Classification here is deliberately narrower than the primary's: only an
//! HTTP 429 counts as rate-limited, everything else aborts the provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderSettings;
use crate::error::{CoachError, CoachResult};
use crate::provider::TextGenerator;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const MAX_TOKENS: u32 = 1024;

pub struct OpenRouterGenerator {
    model: String,
    temperature: f64,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterGenerator {
    pub fn new(settings: &ProviderSettings) -> CoachResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| CoachError::Upstream(format!("failed to create HTTP client: {e}")))?;
        Ok(OpenRouterGenerator {
            model: settings.model.clone(),
            temperature: settings.temperature,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    async fn invoke(&self, credential: &str, prompt: &str) -> CoachResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {credential}"))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CoachError::Upstream(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            if status.as_u16() == 429 {
                return Err(CoachError::RateLimited(error_text));
            }
            return Err(CoachError::Upstream(format!(
                "API request failed ({status}): {error_text}"
            )));
        }

        let response_body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CoachError::Upstream(format!("failed to parse response: {e}")))?;

        response_body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CoachError::Upstream("response contained no choices".to_string()))
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

// OpenAI-compatible API types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}
