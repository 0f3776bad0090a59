//! Session state machine for a single practice run.
//!
//! A session sequences turns against one scenario: `Active` is where user
//! turns are processed, `HintRequested` gates the coach-hint flow behind an
//! explicit confirmation, and `Complete` is terminal and freezes the
//! record. Generation is asynchronous, so a turn is split in two: the user
//! message is appended immediately (`begin_user_turn`) and the model's
//! outcome is attached later (`apply_turn`). Outcomes tagged with a
//! different session id are stale leftovers from an abandoned session and
//! are discarded.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::objectives::{objective_satisfied, parse_objectives};
use crate::turn::TurnOutcome;
use crate::types::{ConversationMessage, EqScores, Scenario};

/// Minimum accepted user turns before a session may be completed.
pub const MIN_USER_TURNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    HintRequested,
    Complete,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("operation not allowed while session is {0:?}")]
    InvalidPhase(SessionPhase),
    #[error("turn belongs to a discarded session")]
    StaleTurn,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("session needs at least {MIN_USER_TURNS} user turns to complete, has {0}")]
    TooFewUserTurns(usize),
}

/// Handle for an in-flight user turn. The session id ties the eventual
/// outcome back to the session that issued it.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    session_id: String,
    message_id: String,
    content: String,
    history: Vec<ConversationMessage>,
}

impl PendingTurn {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Conversation as it stood before this turn's user message.
    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }
}

/// Handle for a confirmed in-flight hint request.
#[derive(Debug, Clone)]
pub struct HintTicket {
    session_id: String,
}

pub struct Session {
    id: String,
    scenario: Scenario,
    phase: SessionPhase,
    messages: Vec<ConversationMessage>,
    scores: EqScores,
    goals: Vec<String>,
    completed_goals: Vec<String>,
    hints_taken: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Starts a fresh session; the character's opening line (if any) seeds
    /// the conversation.
    pub fn new(scenario: Scenario) -> Self {
        let goals = parse_objectives(&scenario.user_objective);
        let mut messages = Vec::new();
        if !scenario.opening_line.trim().is_empty() {
            messages.push(ConversationMessage::character(scenario.opening_line.clone()));
        }
        Session {
            id: Uuid::new_v4().to_string(),
            scenario,
            phase: SessionPhase::Active,
            messages,
            scores: EqScores::default(),
            goals,
            completed_goals: Vec::new(),
            hints_taken: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn scores(&self) -> &EqScores {
        &self.scores
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn completed_goals(&self) -> &[String] {
        &self.completed_goals
    }

    pub fn hints_taken(&self) -> u32 {
        self.hints_taken
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn user_turn_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user).count()
    }

    /// Appends the user's message and returns a handle the caller uses to
    /// attach the generated outcome once it arrives.
    pub fn begin_user_turn(&mut self, content: &str) -> Result<PendingTurn, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let history = self.messages.clone();
        let message = ConversationMessage::user(content);
        let pending = PendingTurn {
            session_id: self.id.clone(),
            message_id: message.id.clone(),
            content: content.to_string(),
            history,
        };
        self.messages.push(message);
        Ok(pending)
    }

    /// Attaches a completed turn outcome: the analysis lands on the user
    /// message, the character reply is appended, the score vector is
    /// replaced wholesale, and goal completion is re-checked. Goals already
    /// completed are never un-marked.
    pub fn apply_turn(
        &mut self,
        pending: &PendingTurn,
        outcome: TurnOutcome,
    ) -> Result<(), SessionError> {
        if pending.session_id != self.id {
            return Err(SessionError::StaleTurn);
        }
        if self.phase == SessionPhase::Complete {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == pending.message_id)
            .ok_or(SessionError::StaleTurn)?;

        message.eq_analysis = Some(outcome.eq_analysis.clone());
        self.scores = EqScores::from_analysis(&outcome.eq_analysis);
        self.messages
            .push(ConversationMessage::character(outcome.character_response));

        for goal in &self.goals {
            if self.completed_goals.contains(goal) {
                continue;
            }
            if objective_satisfied(goal, &pending.content, &outcome.eq_analysis) {
                self.completed_goals.push(goal.clone());
            }
        }
        Ok(())
    }

    pub fn request_hint(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        self.phase = SessionPhase::HintRequested;
        Ok(())
    }

    /// Backs out of the hint prompt without any upstream call.
    pub fn cancel_hint(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::HintRequested {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        self.phase = SessionPhase::Active;
        Ok(())
    }

    /// Confirms the hint request; the caller invokes the coach and hands
    /// the result back through [`Session::apply_hint`].
    pub fn confirm_hint(&mut self) -> Result<HintTicket, SessionError> {
        if self.phase != SessionPhase::HintRequested {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        self.phase = SessionPhase::Active;
        Ok(HintTicket {
            session_id: self.id.clone(),
        })
    }

    pub fn apply_hint(&mut self, ticket: &HintTicket, hint: String) -> Result<(), SessionError> {
        if ticket.session_id != self.id {
            return Err(SessionError::StaleTurn);
        }
        if self.phase == SessionPhase::Complete {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        self.messages.push(ConversationMessage::coach(hint));
        self.hints_taken += 1;
        Ok(())
    }

    /// Freezes the session. Requires at least [`MIN_USER_TURNS`] accepted
    /// user turns; terminal once entered.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        let turns = self.user_turn_count();
        if turns < MIN_USER_TURNS {
            return Err(SessionError::TooFewUserTurns(turns));
        }
        self.phase = SessionPhase::Complete;
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
