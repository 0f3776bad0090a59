//! Rule-based fallbacks used when upstream generation is unusable.
//!
//! These are deterministic given the same message text and history length
//! (the hint fallback intentionally randomizes among same-dimension
//! options). They keep the practice session flowing when the model output
//! cannot be parsed; rate-limit errors never land here, those fail over
//! inside the orchestrator instead.

use rand::Rng;

use crate::types::{Dimension, EqAnalysis, EqScores};

pub const DEFAULT_FEEDBACK: &str = "Keep practicing your emotional intelligence skills!";

const NEGATIVE_PATTERNS: [&str; 7] = [
    "you always",
    "you never",
    "stupid",
    "idiot",
    "you're wrong",
    "ridiculous",
    "whatever",
];

/// Scores a message with additive keyword rules, starting each dimension at
/// a 50-point baseline and clamping to [0,100].
pub fn fallback_eq_analysis(message: &str) -> EqAnalysis {
    let text = message.to_lowercase();
    let mut self_awareness = 50.0;
    let mut self_management = 50.0;
    let mut social_awareness = 50.0;
    let mut relationship_management = 50.0;

    if text.contains("i feel") || text.contains("i'm feeling") {
        self_awareness += 25.0;
    }
    if text.contains("i notice") || text.contains("i realize") {
        self_awareness += 15.0;
    }

    if NEGATIVE_PATTERNS.iter().any(|p| text.contains(p)) {
        self_management -= 30.0;
    } else {
        self_management += 15.0;
    }

    if text.contains("you feel") || text.contains("you might") || text.contains("your perspective")
    {
        social_awareness += 25.0;
    }
    if text.contains("understand") || text.contains("i hear") || text.contains("i see") {
        social_awareness += 15.0;
    }
    if text.contains("that must be") || text.contains("sounds like") {
        social_awareness += 20.0;
    }

    if text.contains("let's") || text.contains("we could") || text.contains("together") {
        relationship_management += 25.0;
    }
    if text.contains("how about") || text.contains("what if") || text.contains("would it help") {
        relationship_management += 15.0;
    }

    let feedback = if self_awareness >= 70.0 {
        "Great self-awareness! You're expressing your emotions clearly."
    } else if social_awareness >= 70.0 {
        "Strong empathy shown - you're acknowledging the other person's perspective."
    } else if self_awareness < 50.0 {
        "Try using 'I feel' statements to express your emotions more clearly."
    } else if social_awareness < 50.0 {
        "Try acknowledging how the other person might be feeling."
    } else {
        DEFAULT_FEEDBACK
    };

    EqAnalysis::from_raw(
        self_awareness,
        self_management,
        social_awareness,
        relationship_management,
        feedback.to_string(),
    )
}

const DEFENSIVE_RESPONSES: [&str; 3] = [
    "Wait, what? I thought we did great together. What are you saying?",
    "Are you implying I did something wrong? That's not how I see it.",
    "This feels a bit unfair. I worked really hard on this too.",
];

const RECEPTIVE_RESPONSES: [&str; 3] = [
    "Oh... I hadn't realized that's how it came across. I'm sorry.",
    "You're right, I should have been more explicit. What can I do to make this right?",
    "I appreciate you telling me. Let me think about how to fix this.",
];

const NEUTRAL_RESPONSES: [&str; 3] = [
    "Hmm, tell me more about what you're thinking.",
    "I'm listening. What specifically bothered you?",
    "That's interesting. How do you think we should handle this?",
];

/// Canned in-character reply. The tone is classified from the user's
/// message; the line is indexed by history length modulo list length so
/// repeated fallbacks within a session vary instead of repeating.
pub fn fallback_character_response(message: &str, history_len: usize) -> String {
    let text = message.to_lowercase();

    let responses: &[&str] = if text.contains("you did")
        || text.contains("you didn't")
        || text.contains("you took")
    {
        &DEFENSIVE_RESPONSES
    } else if text.contains("i feel") || text.contains("i understand") || text.contains("appreciate")
    {
        &RECEPTIVE_RESPONSES
    } else {
        &NEUTRAL_RESPONSES
    };

    responses[history_len % responses.len()].to_string()
}

fn hint_options(dimension: Dimension) -> [&'static str; 2] {
    match dimension {
        Dimension::SelfAwareness => [
            "💡 Try starting with 'I feel...' to express your emotions clearly.",
            "💡 Name your emotion: 'I notice I'm feeling frustrated because...'",
        ],
        Dimension::SelfManagement => [
            "💡 Pause and soften your tone. Use curiosity instead of accusations.",
            "💡 Replace 'You always...' with 'I've noticed...' for a calmer approach.",
        ],
        Dimension::SocialAwareness => [
            "💡 Acknowledge their perspective: 'I can see why you might feel that way...'",
            "💡 Ask about their experience: 'How did that situation feel for you?'",
        ],
        Dimension::RelationshipManagement => [
            "💡 Propose a solution together: 'What if we tried...' or 'How about we...'",
            "💡 Find common ground: 'We both want this to work out. Let's figure this out together.'",
        ],
    }
}

/// Canned hint for the weakest dimension, chosen at random among that
/// dimension's options.
pub fn fallback_hint(scores: &EqScores) -> String {
    let options = hint_options(scores.weakest());
    let pick = rand::thread_rng().gen_range(0..options.len());
    options[pick].to_string()
}

/// Fixed set of 3 canned suggestions for the weakest dimension.
pub fn fallback_improvements(scores: &EqScores) -> Vec<String> {
    let suggestions: [&str; 3] = match scores.weakest() {
        Dimension::SelfAwareness => [
            "Open difficult messages by naming your own emotion, for example 'I feel overlooked when...'.",
            "Before responding, take a moment to identify what you are actually feeling and say it out loud.",
            "Use emotional vocabulary beyond 'good' and 'bad', such as 'frustrated', 'anxious', or 'hopeful'.",
        ],
        Dimension::SelfManagement => [
            "When you notice blame language forming, rephrase it as an observation: 'I've noticed...' instead of 'You always...'.",
            "Slow the conversation down with a clarifying question before reacting to a provocation.",
            "Keep your responses measured; one calm sentence lands better than three heated ones.",
        ],
        Dimension::SocialAwareness => [
            "Reflect the other person's feelings back to them: 'It sounds like that was stressful for you.'",
            "Ask an open question about their perspective before stating your own.",
            "Acknowledge their constraints explicitly: 'I can see you're juggling a lot right now.'",
        ],
        Dimension::RelationshipManagement => [
            "Close difficult exchanges with a concrete joint next step: 'How about we review this together on Friday?'",
            "Use 'we' language when proposing solutions to keep the conversation collaborative.",
            "Offer a trade rather than a demand: 'What if I handle X and you take Y?'",
        ],
    };
    suggestions.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empathetic_message_scores_high_on_awareness_dimensions() {
        let analysis = fallback_eq_analysis(
            "I feel frustrated that the deadline moved without telling me, but I understand you're juggling a lot too.",
        );
        assert!(analysis.self_awareness >= 75.0);
        assert!(analysis.social_awareness >= 65.0);
        assert_eq!(analysis.self_management, 65.0);
        assert_eq!(
            analysis.overall_score,
            (analysis.self_awareness
                + analysis.self_management
                + analysis.social_awareness
                + analysis.relationship_management)
                / 4.0
        );
    }

    #[test]
    fn accusatory_message_drops_self_management() {
        let analysis = fallback_eq_analysis("You always do this, it's ridiculous.");
        assert_eq!(analysis.self_management, 20.0);
    }

    #[test]
    fn feedback_thresholds() {
        let high_sa = fallback_eq_analysis("I feel sad about this.");
        assert!(high_sa.feedback.contains("self-awareness"));

        let high_soa = fallback_eq_analysis("That must be hard, I hear you.");
        assert!(high_soa.feedback.contains("empathy"));

        let plain = fallback_eq_analysis("Okay.");
        assert_eq!(plain.feedback, DEFAULT_FEEDBACK);
    }

    #[test]
    fn character_fallback_is_deterministic_per_history_length() {
        let first = fallback_character_response("you did this on purpose", 4);
        let second = fallback_character_response("you did this on purpose", 4);
        assert_eq!(first, second);
        assert_eq!(first, DEFENSIVE_RESPONSES[1]);

        let receptive = fallback_character_response("I feel a bit hurt", 0);
        assert_eq!(receptive, RECEPTIVE_RESPONSES[0]);

        let neutral = fallback_character_response("okay then", 2);
        assert_eq!(neutral, NEUTRAL_RESPONSES[2]);
    }

    #[test]
    fn hint_fallback_targets_weakest_dimension() {
        let scores = EqScores {
            self_awareness: 80.0,
            self_management: 80.0,
            social_awareness: 30.0,
            relationship_management: 80.0,
        };
        for _ in 0..8 {
            let hint = fallback_hint(&scores);
            assert!(hint.starts_with("💡"));
            assert!(hint_options(Dimension::SocialAwareness).contains(&hint.as_str()));
        }
    }

    #[test]
    fn improvements_are_three_per_dimension() {
        for dimension in Dimension::ALL {
            let mut scores = EqScores {
                self_awareness: 90.0,
                self_management: 90.0,
                social_awareness: 90.0,
                relationship_management: 90.0,
            };
            match dimension {
                Dimension::SelfAwareness => scores.self_awareness = 10.0,
                Dimension::SelfManagement => scores.self_management = 10.0,
                Dimension::SocialAwareness => scores.social_awareness = 10.0,
                Dimension::RelationshipManagement => scores.relationship_management = 10.0,
            }
            assert_eq!(fallback_improvements(&scores).len(), 3);
        }
    }
}
