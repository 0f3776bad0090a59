//! Retry/failover orchestration across providers and credentials.
//!
//! Rate limits are transient and provider-local, so they warrant trying the
//! same provider's next key. Anything else (auth failure, malformed
//! request, timeout) is not fixed by switching keys within the provider, so
//! the loop escalates to the next provider instead of burning retries.
//! Attempts are issued strictly sequentially; there is never more than one
//! in-flight upstream call per logical request.

use std::future::Future;
use std::sync::Arc;

use crate::config::CoachConfig;
use crate::credentials::CredentialPool;
use crate::error::{CoachError, CoachResult};
use crate::provider::{GeminiGenerator, OpenRouterGenerator, TextGenerator};
use crate::types::GenerationRequest;

/// One provider plus one concrete credential, handed to a unit of work.
pub struct ModelHandle {
    adapter: Arc<dyn TextGenerator>,
    credential: String,
}

impl ModelHandle {
    pub fn provider(&self) -> &str {
        self.adapter.name()
    }

    pub async fn generate(&self, prompt: &str) -> CoachResult<String> {
        self.adapter.invoke(&self.credential, prompt).await
    }
}

/// A provider adapter paired with its credential pool.
pub struct ProviderSlot {
    adapter: Arc<dyn TextGenerator>,
    pool: CredentialPool,
}

impl ProviderSlot {
    pub fn new(adapter: Arc<dyn TextGenerator>, pool: CredentialPool) -> Self {
        ProviderSlot { adapter, pool }
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }
}

pub struct Orchestrator {
    slots: Vec<ProviderSlot>,
}

impl Orchestrator {
    /// Slots are tried in the order given; the first is the primary.
    pub fn new(slots: Vec<ProviderSlot>) -> Self {
        Orchestrator { slots }
    }

    /// Builds the production primary/secondary pair from configuration.
    /// Providers without credentials are left out (degraded, not fatal).
    pub fn from_config(config: &CoachConfig) -> CoachResult<Self> {
        let mut slots = Vec::new();
        if config.gemini.api_keys.is_empty() {
            log::warn!("no Gemini credentials configured; primary provider unavailable");
        } else {
            slots.push(ProviderSlot::new(
                Arc::new(GeminiGenerator::new(&config.gemini)?),
                CredentialPool::new("gemini", config.gemini.api_keys.clone()),
            ));
        }
        if config.openrouter.api_keys.is_empty() {
            log::warn!("no OpenRouter credentials configured; secondary provider unavailable");
        } else {
            slots.push(ProviderSlot::new(
                Arc::new(OpenRouterGenerator::new(&config.openrouter)?),
                CredentialPool::new("openrouter", config.openrouter.api_keys.clone()),
            ));
        }
        Ok(Orchestrator::new(slots))
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    /// Runs `work` against providers and credentials in priority order.
    ///
    /// Per provider: up to pool-size attempts starting at the pool's
    /// current cursor. A `RateLimited` failure moves to the provider's next
    /// credential; any other failure aborts that provider and escalates to
    /// the next one. On the first success the winning pool's cursor is
    /// advanced past the credential that succeeded.
    pub async fn execute<T, F, Fut>(&self, work: F) -> CoachResult<T>
    where
        F: Fn(ModelHandle) -> Fut,
        Fut: Future<Output = CoachResult<T>>,
    {
        let mut last_error: Option<CoachError> = None;

        for slot in &self.slots {
            let size = slot.pool.len();
            if size == 0 {
                log::debug!("provider {} has no credentials, skipping", slot.adapter.name());
                continue;
            }
            let start = slot.pool.cursor();
            for attempt in 0..size {
                let index = (start + attempt) % size;
                let handle = ModelHandle {
                    adapter: Arc::clone(&slot.adapter),
                    credential: slot.pool.credential_at(index).to_string(),
                };
                match work(handle).await {
                    Ok(value) => {
                        slot.pool.advance_past(index);
                        log::debug!(
                            "dispatch succeeded on provider {} (credential {}/{})",
                            slot.adapter.name(),
                            index + 1,
                            size
                        );
                        return Ok(value);
                    }
                    Err(CoachError::RateLimited(message)) => {
                        log::warn!(
                            "provider {} credential {}/{} rate limited, rotating: {}",
                            slot.adapter.name(),
                            index + 1,
                            size,
                            message
                        );
                        last_error = Some(CoachError::RateLimited(message));
                    }
                    Err(error) => {
                        log::warn!(
                            "provider {} failed ({}), escalating to next provider",
                            slot.adapter.name(),
                            error
                        );
                        last_error = Some(error);
                        break;
                    }
                }
            }
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "all credentials exhausted".to_string());
        Err(CoachError::AllProvidersExhausted(detail))
    }

    /// Convenience wrapper for plain text generation.
    pub async fn generate(&self, request: &GenerationRequest) -> CoachResult<String> {
        let action = request.action;
        let prompt = request.prompt.clone();
        let result = self
            .execute(move |model| {
                let prompt = prompt.clone();
                async move { model.generate(&prompt).await }
            })
            .await;
        if let Err(error) = &result {
            log::warn!("generation for action {} failed: {}", action.as_str(), error);
        }
        result
    }
}
