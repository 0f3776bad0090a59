//! Error taxonomy for the LLM request layer.
//!
//! Classification happens at the provider adapter boundary: adapters map
//! their upstream error shapes into `RateLimited` or `Upstream` before the
//! orchestrator ever sees them, so the failover logic stays
//! provider-agnostic. `MalformedOutput` never crosses the turn processor
//! (it is absorbed by the rule-based fallbacks); `AllProvidersExhausted` is
//! the only failure that reaches the HTTP boundary.

use thiserror::Error;

pub type CoachResult<T> = Result<T, CoachError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoachError {
    /// The provider rejected the call due to quota/throughput limits.
    /// Triggers key rotation and provider failover, never surfaced to the
    /// end user.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other provider failure (auth, malformed request, transport,
    /// timeout). Aborts the current provider's retry loop and escalates to
    /// the next provider.
    #[error("upstream provider error: {0}")]
    Upstream(String),

    /// The model returned text we could not parse into the expected shape.
    /// Absorbed locally by the deterministic fallbacks.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    /// A provider was asked for a credential but its pool is empty.
    #[error("no credentials configured for provider '{0}'")]
    NoCredentials(String),

    /// Every credential of every provider failed. Carries the last observed
    /// error, or a generic message when no attempt ever ran.
    #[error("all providers exhausted: {0}")]
    AllProvidersExhausted(String),
}
