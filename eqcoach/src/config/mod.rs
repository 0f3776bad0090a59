//! Process configuration.
//!
//! Credentials and model settings are read once at startup from the
//! environment. A provider with no configured keys is degraded to
//! "unavailable" rather than failing startup; the orchestrator simply
//! skips it.

use std::env;

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Maximum numbered key suffix probed (`GEMINI_API_KEY_1` ..).
const MAX_NUMBERED_KEYS: usize = 16;

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_keys: Vec<String>,
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CoachConfig {
    pub gemini: ProviderSettings,
    pub openrouter: ProviderSettings,
}

impl CoachConfig {
    pub fn from_env() -> Self {
        let timeout_seconds = env::var("LLM_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        CoachConfig {
            gemini: ProviderSettings {
                api_keys: collect_keys("GEMINI_API_KEY"),
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
                temperature: DEFAULT_TEMPERATURE,
                timeout_seconds,
                base_url: env::var("GEMINI_BASE_URL").ok(),
            },
            openrouter: ProviderSettings {
                api_keys: collect_keys("OPENROUTER_API_KEY"),
                model: env::var("OPENROUTER_MODEL")
                    .unwrap_or_else(|_| DEFAULT_OPENROUTER_MODEL.to_string()),
                temperature: DEFAULT_TEMPERATURE,
                timeout_seconds,
                base_url: env::var("OPENROUTER_BASE_URL").ok(),
            },
        }
    }
}

/// Gathers `PREFIX` and `PREFIX_1` .. `PREFIX_n` in order, skipping unset
/// or blank entries; gaps in the numbering are tolerated.
fn collect_keys(prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Ok(key) = env::var(prefix) {
        if !key.trim().is_empty() {
            keys.push(key);
        }
    }
    for i in 1..=MAX_NUMBERED_KEYS {
        if let Ok(key) = env::var(format!("{prefix}_{i}")) {
            if !key.trim().is_empty() {
                keys.push(key);
            }
        }
    }
    keys
}
