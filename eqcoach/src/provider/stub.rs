//! Deterministic scripted generator for tests and development.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CoachError, CoachResult};
use crate::provider::TextGenerator;

#[derive(Debug, Clone)]
pub enum StubOutcome {
    Text(String),
    RateLimited,
    Upstream,
}

impl StubOutcome {
    fn into_result(self) -> CoachResult<String> {
        match self {
            StubOutcome::Text(text) => Ok(text),
            StubOutcome::RateLimited => Err(CoachError::RateLimited("stub: 429".to_string())),
            StubOutcome::Upstream => Err(CoachError::Upstream("stub: upstream failure".to_string())),
        }
    }
}

/// Plays back a fixed script of outcomes, then keeps returning the
/// configured default (if any). Every invocation records the credential it
/// was handed so tests can assert rotation behavior.
pub struct StubGenerator {
    name: String,
    script: Mutex<VecDeque<StubOutcome>>,
    default: Option<StubOutcome>,
    calls: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn scripted(name: impl Into<String>, outcomes: Vec<StubOutcome>) -> Self {
        StubGenerator {
            name: name.into(),
            script: Mutex::new(outcomes.into()),
            default: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A generator that succeeds on every call with the same text.
    pub fn always(name: impl Into<String>, text: impl Into<String>) -> Self {
        StubGenerator {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            default: Some(StubOutcome::Text(text.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A generator that fails every call with the same classified error.
    pub fn failing(name: impl Into<String>, outcome: StubOutcome) -> Self {
        StubGenerator {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            default: Some(outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Credentials handed to this generator, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("stub calls lock").clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn invoke(&self, credential: &str, _prompt: &str) -> CoachResult<String> {
        self.calls
            .lock()
            .expect("stub calls lock")
            .push(credential.to_string());
        let scripted = self.script.lock().expect("stub script lock").pop_front();
        match scripted.or_else(|| self.default.clone()) {
            Some(outcome) => outcome.into_result(),
            None => Err(CoachError::Upstream("stub: script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
