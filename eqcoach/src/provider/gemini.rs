//! Google Generative Language adapter (primary provider).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderSettings;
use crate::error::{CoachError, CoachResult};
use crate::provider::{looks_rate_limited, TextGenerator};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiGenerator {
    model: String,
    temperature: f64,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(settings: &ProviderSettings) -> CoachResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| CoachError::Upstream(format!("failed to create HTTP client: {e}")))?;
        Ok(GeminiGenerator {
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
impl TextGenerator for GeminiGenerator {
    async fn invoke(&self, credential: &str, prompt: &str) -> CoachResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, credential
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
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
            // Gemini signals quota pressure both via 429 and via error
            // payloads on other statuses.
            if status.as_u16() == 429 || looks_rate_limited(&error_text) {
                return Err(CoachError::RateLimited(truncate(&error_text)));
            }
            return Err(CoachError::Upstream(format!(
                "API request failed ({status}): {}",
                truncate(&error_text)
            )));
        }

        let response_body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CoachError::Upstream(format!("failed to parse response: {e}")))?;

        let text = response_body
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CoachError::Upstream(
                "response contained no candidates".to_string(),
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn truncate(text: &str) -> String {
    if text.len() > 200 {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < 200)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &text[..cut])
    } else {
        text.to_string()
    }
}

// Generative Language API types
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}
