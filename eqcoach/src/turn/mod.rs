//! Conversation turn processing: prompt construction, structured-output
//! parsing, and rule-based fallbacks.
//!
//! Provider and credential selection stay inside the orchestrator; this
//! layer only decides what to ask and how to interpret the answer. When a
//! response comes back but cannot be parsed, the deterministic fallback is
//! used so the session keeps flowing. When no provider produced anything at
//! all, the exhaustion error propagates to the caller.

mod fallback;
mod prompt;

pub use fallback::{
    fallback_character_response, fallback_eq_analysis, fallback_hint, fallback_improvements,
    DEFAULT_FEEDBACK,
};

use std::sync::Arc;

use serde::Deserialize;

use crate::error::CoachResult;
use crate::orchestrator::Orchestrator;
use crate::types::{Action, ConversationMessage, EqAnalysis, EqScores, GenerationRequest, Scenario};
use crate::utils::extract_json_object;

const HINT_MARKER: &str = "💡";
const MAX_REPLY_CHARS: usize = 500;
const MAX_SUGGESTIONS: usize = 3;

/// Combined analysis + in-character reply, the primary per-turn result.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub eq_analysis: EqAnalysis,
    pub character_response: String,
}

/// Raw model-supplied analysis before clamping and overall-score
/// recomputation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    self_awareness: f64,
    self_management: f64,
    social_awareness: f64,
    relationship_management: f64,
    #[serde(default)]
    feedback: Option<String>,
}

impl RawAnalysis {
    fn into_analysis(self) -> EqAnalysis {
        let feedback = self
            .feedback
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string());
        EqAnalysis::from_raw(
            self.self_awareness,
            self.self_management,
            self.social_awareness,
            self.relationship_management,
            feedback,
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCombined {
    #[serde(flatten)]
    analysis: RawAnalysis,
    #[serde(default)]
    character_response: Option<String>,
}

#[derive(Deserialize)]
struct RawSuggestions {
    #[serde(default)]
    suggestions: Vec<String>,
}

pub struct TurnProcessor {
    orchestrator: Arc<Orchestrator>,
}

impl TurnProcessor {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        TurnProcessor { orchestrator }
    }

    /// Scores one user message across the four EQ dimensions.
    pub async fn analyze_eq(&self, message: &str, scenario: &Scenario) -> CoachResult<EqAnalysis> {
        let request = GenerationRequest::new(
            Action::AnalyzeEq,
            prompt::eq_analysis_prompt(message, scenario),
        );
        let text = self.orchestrator.generate(&request).await?;
        Ok(parse_analysis(&text).unwrap_or_else(|| {
            log::warn!("unparseable EQ analysis output, using rule-based fallback");
            fallback_eq_analysis(message)
        }))
    }

    /// Generates the character's in-character reply to one user message.
    pub async fn generate_character_response(
        &self,
        message: &str,
        scenario: &Scenario,
        history: &[ConversationMessage],
    ) -> CoachResult<String> {
        let request = GenerationRequest::new(
            Action::GenerateResponse,
            prompt::character_response_prompt(message, scenario, history),
        );
        let text = self.orchestrator.generate(&request).await?;
        let reply = clean_reply(&text, &scenario.character_name);
        if reply.is_empty() {
            log::warn!("empty character reply, using canned fallback");
            return Ok(fallback_character_response(message, history.len()));
        }
        Ok(reply)
    }

    /// One actionable coaching tip targeting the weakest dimension.
    pub async fn get_coach_hint(
        &self,
        scenario: &Scenario,
        history: &[ConversationMessage],
        scores: &EqScores,
    ) -> CoachResult<String> {
        let request = GenerationRequest::new(
            Action::GetHint,
            prompt::coach_hint_prompt(scenario, history, scores),
        );
        let text = self.orchestrator.generate(&request).await?;
        let hint = text.trim();
        if hint.is_empty() {
            return Ok(fallback_hint(scores));
        }
        if hint.starts_with(HINT_MARKER) {
            Ok(hint.to_string())
        } else {
            Ok(format!("{HINT_MARKER} {hint}"))
        }
    }

    /// Up to 3 improvement suggestions for the weakest dimension.
    pub async fn get_improvement_suggestions(
        &self,
        scenario: &Scenario,
        scores: &EqScores,
        history: &[ConversationMessage],
    ) -> CoachResult<Vec<String>> {
        let request = GenerationRequest::new(
            Action::GetImprovements,
            prompt::improvement_prompt(scenario, scores, history),
        );
        let text = self.orchestrator.generate(&request).await?;
        let mut suggestions = extract_json_object(&text)
            .and_then(|json| serde_json::from_str::<RawSuggestions>(json).ok())
            .map(|raw| raw.suggestions)
            .unwrap_or_default();
        suggestions.retain(|s| !s.trim().is_empty());
        if suggestions.is_empty() {
            log::warn!("unparseable improvement output, using canned fallback");
            return Ok(fallback_improvements(scores));
        }
        suggestions.truncate(MAX_SUGGESTIONS);
        Ok(suggestions)
    }

    /// Combined analysis + reply in a single upstream call. This is the
    /// primary path for live turns; the separate operations above exist for
    /// isolated testing and older clients.
    pub async fn analyze_and_respond(
        &self,
        message: &str,
        scenario: &Scenario,
        history: &[ConversationMessage],
    ) -> CoachResult<TurnOutcome> {
        let request = GenerationRequest::new(
            Action::AnalyzeAndRespond,
            prompt::combined_prompt(message, scenario, history),
        );
        let text = self.orchestrator.generate(&request).await?;

        let combined = extract_json_object(&text)
            .and_then(|json| serde_json::from_str::<RawCombined>(json).ok());
        match combined {
            Some(raw) => {
                let reply = raw
                    .character_response
                    .map(|r| clean_reply(&r, &scenario.character_name))
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| fallback_character_response(message, history.len()));
                Ok(TurnOutcome {
                    eq_analysis: raw.analysis.into_analysis(),
                    character_response: reply,
                })
            }
            None => {
                log::warn!("unparseable combined output, using rule-based fallback");
                Ok(TurnOutcome {
                    eq_analysis: fallback_eq_analysis(message),
                    character_response: fallback_character_response(message, history.len()),
                })
            }
        }
    }
}

fn parse_analysis(text: &str) -> Option<EqAnalysis> {
    let json = extract_json_object(text)?;
    let raw: RawAnalysis = serde_json::from_str(json).ok()?;
    Some(raw.into_analysis())
}

/// Strips a leading `<CharacterName>:` echo (case-insensitive), trims, and
/// truncates to 500 characters with an ellipsis.
fn clean_reply(text: &str, character_name: &str) -> String {
    let mut reply = text.trim();

    let prefix_len = character_name.len();
    if reply.len() > prefix_len && reply.is_char_boundary(prefix_len) {
        let (head, tail) = reply.split_at(prefix_len);
        if head.eq_ignore_ascii_case(character_name) {
            if let Some(rest) = tail.strip_prefix(':') {
                reply = rest.trim_start();
            }
        }
    }

    let mut chars = reply.char_indices();
    match chars.nth(MAX_REPLY_CHARS) {
        Some((cut, _)) => format!("{}...", reply[..cut].trim_end()),
        None => reply.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialPool;
    use crate::orchestrator::ProviderSlot;
    use crate::provider::{StubGenerator, StubOutcome};
    use pretty_assertions::assert_eq;

    fn scenario() -> Scenario {
        Scenario {
            id: "s1".to_string(),
            title: "Project credit".to_string(),
            context: "A colleague presented your work as theirs.".to_string(),
            user_objective: "Express your feelings and work toward a resolution".to_string(),
            character_name: "Alex".to_string(),
            character_persona: "Ambitious, conflict-averse teammate".to_string(),
            opening_line: "Hey, great meeting today!".to_string(),
        }
    }

    fn processor_with(outcomes: Vec<StubOutcome>) -> TurnProcessor {
        let stub = Arc::new(StubGenerator::scripted("stub", outcomes));
        let orchestrator = Orchestrator::new(vec![ProviderSlot::new(
            stub,
            CredentialPool::new("stub", vec!["k".to_string()]),
        )]);
        TurnProcessor::new(Arc::new(orchestrator))
    }

    fn text(s: &str) -> StubOutcome {
        StubOutcome::Text(s.to_string())
    }

    #[tokio::test]
    async fn analyze_eq_parses_json_embedded_in_prose() {
        let processor = processor_with(vec![text(
            r#"Sure! Here is the analysis:
{"selfAwareness": 120, "selfManagement": 70, "socialAwareness": 60, "relationshipManagement": 55, "feedback": "Nice work."}
Hope that helps."#,
        )]);
        let analysis = processor.analyze_eq("I feel upset", &scenario()).await.unwrap();
        assert_eq!(analysis.self_awareness, 100.0);
        assert_eq!(analysis.overall_score, (100.0 + 70.0 + 60.0 + 55.0) / 4.0);
        assert_eq!(analysis.feedback, "Nice work.");
    }

    #[tokio::test]
    async fn analyze_eq_missing_feedback_gets_default() {
        let processor = processor_with(vec![text(
            r#"{"selfAwareness": 60, "selfManagement": 60, "socialAwareness": 60, "relationshipManagement": 60}"#,
        )]);
        let analysis = processor.analyze_eq("hello", &scenario()).await.unwrap();
        assert_eq!(analysis.feedback, DEFAULT_FEEDBACK);
    }

    #[tokio::test]
    async fn analyze_eq_falls_back_on_unparseable_output() {
        let processor = processor_with(vec![text("I'd rather write poetry than JSON.")]);
        let analysis = processor
            .analyze_eq("You always do this, it's ridiculous.", &scenario())
            .await
            .unwrap();
        assert_eq!(analysis.self_management, 20.0);
    }

    #[tokio::test]
    async fn exhaustion_propagates_instead_of_falling_back() {
        let processor = processor_with(vec![StubOutcome::Upstream]);
        let error = processor.analyze_eq("hello", &scenario()).await.unwrap_err();
        assert!(matches!(
            error,
            crate::error::CoachError::AllProvidersExhausted(_)
        ));
    }

    #[tokio::test]
    async fn character_reply_strips_name_echo_and_truncates() {
        let processor = processor_with(vec![text("alex:  Fine, let's talk about it.")]);
        let reply = processor
            .generate_character_response("I feel hurt", &scenario(), &[])
            .await
            .unwrap();
        assert_eq!(reply, "Fine, let's talk about it.");

        let long = format!("Alex: {}", "x".repeat(600));
        let processor = processor_with(vec![text(&long)]);
        let reply = processor
            .generate_character_response("I feel hurt", &scenario(), &[])
            .await
            .unwrap();
        assert!(reply.ends_with("..."));
        assert_eq!(reply.chars().count(), MAX_REPLY_CHARS + 3);
    }

    #[tokio::test]
    async fn empty_character_reply_uses_canned_fallback() {
        let processor = processor_with(vec![text("Alex:")]);
        let history = vec![ConversationMessage::character("Hey!")];
        let reply = processor
            .generate_character_response("I feel hurt", &scenario(), &history)
            .await
            .unwrap();
        assert_eq!(reply, fallback_character_response("I feel hurt", 1));
    }

    #[tokio::test]
    async fn hint_marker_is_prepended_when_missing() {
        let processor = processor_with(vec![text("Try an 'I feel' opener.")]);
        let hint = processor
            .get_coach_hint(&scenario(), &[], &EqScores::default())
            .await
            .unwrap();
        assert_eq!(hint, "💡 Try an 'I feel' opener.");

        let processor = processor_with(vec![text("💡 Already marked.")]);
        let hint = processor
            .get_coach_hint(&scenario(), &[], &EqScores::default())
            .await
            .unwrap();
        assert_eq!(hint, "💡 Already marked.");
    }

    #[tokio::test]
    async fn improvements_are_truncated_to_three() {
        let processor = processor_with(vec![text(
            r#"{"suggestions": ["one", "two", "three", "four", "five"]}"#,
        )]);
        let suggestions = processor
            .get_improvement_suggestions(&scenario(), &EqScores::default(), &[])
            .await
            .unwrap();
        assert_eq!(suggestions, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn improvements_fall_back_when_list_is_empty() {
        let processor = processor_with(vec![text(r#"{"suggestions": []}"#)]);
        let suggestions = processor
            .get_improvement_suggestions(&scenario(), &EqScores::default(), &[])
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 3);
    }

    #[tokio::test]
    async fn combined_turn_parses_both_halves() {
        let processor = processor_with(vec![text(
            r#"{"selfAwareness": 80, "selfManagement": 70, "socialAwareness": 60, "relationshipManagement": 50, "feedback": "Good.", "characterResponse": "Alex: Oh, I didn't know you felt that way."}"#,
        )]);
        let outcome = processor
            .analyze_and_respond("I feel hurt", &scenario(), &[])
            .await
            .unwrap();
        assert_eq!(outcome.eq_analysis.self_awareness, 80.0);
        assert_eq!(
            outcome.character_response,
            "Oh, I didn't know you felt that way."
        );
    }

    #[tokio::test]
    async fn combined_turn_falls_back_wholesale_on_garbage() {
        let processor = processor_with(vec![text("no json here")]);
        let history = vec![
            ConversationMessage::character("Hey!"),
            ConversationMessage::user("You did this."),
        ];
        let outcome = processor
            .analyze_and_respond("You did this.", &scenario(), &history)
            .await
            .unwrap();
        assert_eq!(
            outcome.character_response,
            fallback_character_response("You did this.", 2)
        );
        assert_eq!(outcome.eq_analysis, fallback_eq_analysis("You did this."));
    }
}
