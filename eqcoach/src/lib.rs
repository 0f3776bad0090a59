//! EQ Conversation Coach core
//!
//! This crate implements the request layer behind a difficult-conversation
//! practice service: a user turn goes in, an EQ score and an in-character
//! reply come out. The interesting machinery is the multi-provider LLM
//! plumbing underneath:
//!
//! - **Credential pools**: ordered API keys per provider with a round-robin
//!   cursor advanced on successful dispatch only.
//! - **Provider adapters**: one normalized text-in/text-out call per
//!   upstream service, with error classification at the adapter boundary.
//! - **Orchestrator**: rotates keys on rate limits, fails over to the
//!   secondary provider on anything else, and reports exhaustion once both
//!   providers are out of options.
//! - **Turn processor**: renders prompts, parses strict-JSON model output,
//!   and substitutes deterministic rule-based results when the model output
//!   is unusable.
//! - **Session state machine**: sequences turns, tracks scores and
//!   objective completion, and discards stale in-flight results.

pub mod config;
pub mod credentials;
pub mod error;
pub mod objectives;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod turn;
pub mod types;
pub mod utils;

pub use config::{CoachConfig, ProviderSettings};
pub use credentials::CredentialPool;
pub use error::{CoachError, CoachResult};
pub use orchestrator::{ModelHandle, Orchestrator, ProviderSlot};
pub use provider::TextGenerator;
pub use session::{HintTicket, PendingTurn, Session, SessionError, SessionPhase, MIN_USER_TURNS};
pub use turn::{TurnOutcome, TurnProcessor};
pub use types::{
    Action, ConversationMessage, Dimension, EqAnalysis, EqScore, EqScores, GenerationRequest,
    Scenario,
};
