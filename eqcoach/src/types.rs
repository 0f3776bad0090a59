//! Shared domain types and their wire representations.
//!
//! All serde shapes use camelCase field names to match the JSON contract of
//! the web client (`selfAwareness`, `eqAnalysis`, `characterResponse`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scored axis of emotional intelligence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    SelfAwareness,
    SelfManagement,
    SocialAwareness,
    RelationshipManagement,
}

impl Dimension {
    /// Fixed scan order; ties in weakest-dimension selection resolve to the
    /// first minimum encountered in this order.
    pub const ALL: [Dimension; 4] = [
        Dimension::SelfAwareness,
        Dimension::SelfManagement,
        Dimension::SocialAwareness,
        Dimension::RelationshipManagement,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::SelfAwareness => "selfAwareness",
            Dimension::SelfManagement => "selfManagement",
            Dimension::SocialAwareness => "socialAwareness",
            Dimension::RelationshipManagement => "relationshipManagement",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::SelfAwareness => "Self-Awareness",
            Dimension::SelfManagement => "Self-Management",
            Dimension::SocialAwareness => "Social Awareness",
            Dimension::RelationshipManagement => "Relationship Management",
        }
    }
}

/// EQ evaluation of a single user message.
///
/// Scores are always clamped to [0,100] and `overall_score` is recomputed
/// as the arithmetic mean of the four dimensions; a model-supplied overall
/// value is never trusted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqAnalysis {
    pub self_awareness: f64,
    pub self_management: f64,
    pub social_awareness: f64,
    pub relationship_management: f64,
    pub overall_score: f64,
    pub feedback: String,
}

impl EqAnalysis {
    /// Build an analysis from raw (possibly out-of-range) scores, clamping
    /// each dimension and deriving the overall score.
    pub fn from_raw(
        self_awareness: f64,
        self_management: f64,
        social_awareness: f64,
        relationship_management: f64,
        feedback: String,
    ) -> Self {
        let sa = clamp_score(self_awareness);
        let sm = clamp_score(self_management);
        let soa = clamp_score(social_awareness);
        let rm = clamp_score(relationship_management);
        EqAnalysis {
            self_awareness: sa,
            self_management: sm,
            social_awareness: soa,
            relationship_management: rm,
            overall_score: (sa + sm + soa + rm) / 4.0,
            feedback,
        }
    }

    pub fn score(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::SelfAwareness => self.self_awareness,
            Dimension::SelfManagement => self.self_management,
            Dimension::SocialAwareness => self.social_awareness,
            Dimension::RelationshipManagement => self.relationship_management,
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// One `{dimension, score}` entry as exchanged with the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqScore {
    pub dimension: Dimension,
    pub score: f64,
}

/// The current 4-tuple of dimension scores driving the UI and objective
/// checks. Replaced wholesale after each accepted user turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqScores {
    pub self_awareness: f64,
    pub self_management: f64,
    pub social_awareness: f64,
    pub relationship_management: f64,
}

impl Default for EqScores {
    fn default() -> Self {
        EqScores {
            self_awareness: 50.0,
            self_management: 50.0,
            social_awareness: 50.0,
            relationship_management: 50.0,
        }
    }
}

impl EqScores {
    pub fn from_analysis(analysis: &EqAnalysis) -> Self {
        EqScores {
            self_awareness: analysis.self_awareness,
            self_management: analysis.self_management,
            social_awareness: analysis.social_awareness,
            relationship_management: analysis.relationship_management,
        }
    }

    /// Rebuild from wire entries; dimensions absent from the list keep the
    /// 50-point baseline.
    pub fn from_entries(entries: &[EqScore]) -> Self {
        let mut scores = EqScores::default();
        for entry in entries {
            match entry.dimension {
                Dimension::SelfAwareness => scores.self_awareness = entry.score,
                Dimension::SelfManagement => scores.self_management = entry.score,
                Dimension::SocialAwareness => scores.social_awareness = entry.score,
                Dimension::RelationshipManagement => scores.relationship_management = entry.score,
            }
        }
        scores
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::SelfAwareness => self.self_awareness,
            Dimension::SelfManagement => self.self_management,
            Dimension::SocialAwareness => self.social_awareness,
            Dimension::RelationshipManagement => self.relationship_management,
        }
    }

    /// The dimension with the minimum score, first encountered wins on ties.
    pub fn weakest(&self) -> Dimension {
        let mut weakest = Dimension::ALL[0];
        let mut min = self.get(weakest);
        for dimension in &Dimension::ALL[1..] {
            let score = self.get(*dimension);
            if score < min {
                min = score;
                weakest = *dimension;
            }
        }
        weakest
    }

    pub fn to_entries(&self) -> Vec<EqScore> {
        Dimension::ALL
            .iter()
            .map(|d| EqScore {
                dimension: *d,
                score: self.get(*d),
            })
            .collect()
    }
}

/// One message in a practice conversation. Append-only within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    #[serde(default = "new_message_id")]
    pub id: String,
    pub content: String,
    pub is_user: bool,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq_analysis: Option<EqAnalysis>,
    #[serde(default)]
    pub is_coach_intervention: bool,
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ConversationMessage {
            id: new_message_id(),
            content: content.into(),
            is_user: true,
            timestamp: Utc::now(),
            eq_analysis: None,
            is_coach_intervention: false,
        }
    }

    pub fn character(content: impl Into<String>) -> Self {
        ConversationMessage {
            id: new_message_id(),
            content: content.into(),
            is_user: false,
            timestamp: Utc::now(),
            eq_analysis: None,
            is_coach_intervention: false,
        }
    }

    pub fn coach(content: impl Into<String>) -> Self {
        ConversationMessage {
            is_coach_intervention: true,
            ..ConversationMessage::character(content)
        }
    }
}

/// A practice scenario as supplied by the static catalog. The catalog
/// itself lives with the UI; the core only consumes this interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub context: String,
    pub user_objective: String,
    pub character_name: String,
    pub character_persona: String,
    #[serde(default)]
    pub opening_line: String,
}

/// The operation a generation request serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "analyzeEQ")]
    AnalyzeEq,
    #[serde(rename = "generateResponse")]
    GenerateResponse,
    #[serde(rename = "getHint")]
    GetHint,
    #[serde(rename = "getImprovements")]
    GetImprovements,
    #[serde(rename = "analyzeAndRespond")]
    AnalyzeAndRespond,
}

impl Action {
    pub fn parse(value: &str) -> Option<Action> {
        match value {
            "analyzeEQ" => Some(Action::AnalyzeEq),
            "generateResponse" => Some(Action::GenerateResponse),
            "getHint" => Some(Action::GetHint),
            "getImprovements" => Some(Action::GetImprovements),
            "analyzeAndRespond" => Some(Action::AnalyzeAndRespond),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AnalyzeEq => "analyzeEQ",
            Action::GenerateResponse => "generateResponse",
            Action::GetHint => "getHint",
            Action::GetImprovements => "getImprovements",
            Action::AnalyzeAndRespond => "analyzeAndRespond",
        }
    }
}

/// A fully-rendered prompt plus its action tag. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub action: Action,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(action: Action, prompt: String) -> Self {
        GenerationRequest { action, prompt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn analysis_clamps_scores_and_recomputes_overall() {
        let analysis = EqAnalysis::from_raw(150.0, -20.0, 60.0, 80.0, "ok".to_string());
        assert_eq!(analysis.self_awareness, 100.0);
        assert_eq!(analysis.self_management, 0.0);
        assert_eq!(analysis.overall_score, (100.0 + 0.0 + 60.0 + 80.0) / 4.0);
    }

    #[test]
    fn weakest_dimension_prefers_first_on_ties() {
        let scores = EqScores {
            self_awareness: 40.0,
            self_management: 40.0,
            social_awareness: 70.0,
            relationship_management: 40.0,
        };
        assert_eq!(scores.weakest(), Dimension::SelfAwareness);
    }

    #[test]
    fn action_round_trips_wire_names() {
        for name in [
            "analyzeEQ",
            "generateResponse",
            "getHint",
            "getImprovements",
            "analyzeAndRespond",
        ] {
            let action = Action::parse(name).unwrap();
            assert_eq!(action.as_str(), name);
        }
        assert_eq!(Action::parse("analyzeEq"), None);
    }

    #[test]
    fn message_wire_shape_uses_camel_case() {
        let message = ConversationMessage::user("hello");
        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("isUser").unwrap().as_bool().unwrap());
        assert!(value.get("eqAnalysis").is_none());

        let parsed: ConversationMessage =
            serde_json::from_value(serde_json::json!({ "content": "hi", "isUser": false }))
                .unwrap();
        assert!(!parsed.is_user);
        assert!(!parsed.id.is_empty());
    }
}
