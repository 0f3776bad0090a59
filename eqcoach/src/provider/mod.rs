//! Provider adapters.
//!
//! Each adapter wraps one upstream text-generation service behind the same
//! call shape: credential and prompt in, generated text out. Adapters carry
//! a fixed model identifier and sampling temperature, never retry, and
//! classify their own upstream failures into the shared taxonomy before
//! returning; all retry and failover policy lives in the orchestrator.

pub mod gemini;
pub mod openrouter;
pub mod stub;

use async_trait::async_trait;

use crate::error::CoachResult;

pub use gemini::GeminiGenerator;
pub use openrouter::OpenRouterGenerator;
pub use stub::{StubGenerator, StubOutcome};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One generation call against the upstream service.
    async fn invoke(&self, credential: &str, prompt: &str) -> CoachResult<String>;

    /// Short provider name used in logs.
    fn name(&self) -> &str;
}

/// Broad rate-limit sniffing used by the primary provider's classifier:
/// quota-exceeded payloads do not always carry HTTP 429, so the error body
/// is inspected for the usual markers as well.
pub(crate) fn looks_rate_limited(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("429") || lower.contains("quota") || lower.contains("rate limit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_markers_are_recognized() {
        assert!(looks_rate_limited("HTTP 429 Too Many Requests"));
        assert!(looks_rate_limited("Quota exceeded for model"));
        assert!(looks_rate_limited("you have hit a RATE LIMIT"));
        assert!(!looks_rate_limited("invalid api key"));
    }
}
