//! Prompt templates for each conversation-turn operation.
//!
//! Templates are rendered eagerly into plain strings; the orchestrator only
//! ever sees finished prompts.

use crate::types::{ConversationMessage, EqScores, Scenario};

/// `User: ...` / `<CharacterName>: ...` transcript lines.
fn transcript(history: &[ConversationMessage], character_name: &str) -> String {
    history
        .iter()
        .map(|m| {
            let speaker = if m.is_user { "User" } else { character_name };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn eq_analysis_prompt(message: &str, scenario: &Scenario) -> String {
    format!(
        r#"You are an expert emotional intelligence (EQ) analyst. Analyze the following message in the context of a difficult conversation scenario.

SCENARIO: {title}
CONTEXT: {context}
USER'S OBJECTIVE: {objective}

USER'S MESSAGE TO ANALYZE:
"{message}"

Evaluate the message across these 4 EQ dimensions (score 0-100):

1. SELF-AWARENESS: Does the person identify and express their own emotions? Look for "I feel" statements, emotional vocabulary, self-reflection.

2. SELF-MANAGEMENT: Does the person stay calm and composed? Look for measured tone, absence of blame/accusations, thoughtful responses.

3. SOCIAL AWARENESS: Does the person show empathy and understanding? Look for acknowledgment of others' feelings, perspective-taking, active listening cues.

4. RELATIONSHIP MANAGEMENT: Does the person work toward resolution? Look for collaborative language, constructive suggestions, relationship-preserving approach.

Respond in this EXACT JSON format only (no markdown, no extra text):
{{
  "selfAwareness": <number 0-100>,
  "selfManagement": <number 0-100>,
  "socialAwareness": <number 0-100>,
  "relationshipManagement": <number 0-100>,
  "feedback": "<one specific, encouraging sentence about what they did well or could improve>"
}}"#,
        title = scenario.title,
        context = scenario.context,
        objective = scenario.user_objective,
        message = message,
    )
}

pub fn character_response_prompt(
    message: &str,
    scenario: &Scenario,
    history: &[ConversationMessage],
) -> String {
    format!(
        r#"You are playing the role of {name} in a realistic conversation scenario.

YOUR CHARACTER:
{persona}

SCENARIO: {title}
SITUATION: {context}

CONVERSATION SO FAR:
{conversation}

User: {message}

INSTRUCTIONS:
- Respond AS {name}, staying completely in character
- React realistically based on your persona and how the user just spoke to you
- If the user was empathetic and used "I feel" statements, be more receptive
- If the user was accusatory or aggressive, respond defensively but realistically
- Keep response to 1-3 sentences, natural and conversational
- Do NOT break character or mention you're an AI
- Do NOT give advice - just respond as the character would

{name}:"#,
        name = scenario.character_name,
        persona = scenario.character_persona,
        title = scenario.title,
        context = scenario.context,
        conversation = transcript(history, &scenario.character_name),
        message = message,
    )
}

pub fn coach_hint_prompt(
    scenario: &Scenario,
    history: &[ConversationMessage],
    scores: &EqScores,
) -> String {
    let weakest = scores.weakest();
    let recent_start = history.len().saturating_sub(4);
    format!(
        r#"You are an EQ coach helping someone practice a difficult conversation.

SCENARIO: {title}
USER'S GOAL: {objective}

RECENT CONVERSATION:
{recent}

The user's weakest EQ dimension is: {dimension} (score: {score}/100)

Give ONE specific, actionable tip for their next message. The tip should:
- Be 1-2 sentences max
- Include an example phrase they could use
- Focus on improving their {dimension}
- Start with "💡"

Tip:"#,
        title = scenario.title,
        objective = scenario.user_objective,
        recent = transcript(&history[recent_start..], &scenario.character_name),
        dimension = weakest.key(),
        score = scores.get(weakest),
    )
}

pub fn improvement_prompt(
    scenario: &Scenario,
    scores: &EqScores,
    history: &[ConversationMessage],
) -> String {
    let weakest = scores.weakest();
    format!(
        r#"You are an EQ coach reviewing a completed practice conversation.

SCENARIO: {title}
USER'S GOAL: {objective}

CONVERSATION:
{conversation}

The user's weakest EQ dimension is: {dimension} (score: {score}/100)

Give exactly 3 concrete suggestions for how the user could improve in future conversations, focused on their {dimension}. Each suggestion should be one sentence with an example phrase.

Respond in this EXACT JSON format only (no markdown, no extra text):
{{
  "suggestions": ["<suggestion 1>", "<suggestion 2>", "<suggestion 3>"]
}}"#,
        title = scenario.title,
        objective = scenario.user_objective,
        conversation = transcript(history, &scenario.character_name),
        dimension = weakest.key(),
        score = scores.get(weakest),
    )
}

pub fn combined_prompt(
    message: &str,
    scenario: &Scenario,
    history: &[ConversationMessage],
) -> String {
    format!(
        r#"You are powering an EQ practice conversation. Perform TWO tasks in one response.

SCENARIO: {title}
CONTEXT: {context}
USER'S OBJECTIVE: {objective}

CHARACTER YOU PLAY:
{name}: {persona}

CONVERSATION SO FAR:
{conversation}

User: {message}

TASK 1 - Analyze the user's message across 4 EQ dimensions (score 0-100):
1. SELF-AWARENESS: "I feel" statements, emotional vocabulary, self-reflection.
2. SELF-MANAGEMENT: measured tone, absence of blame or accusations.
3. SOCIAL AWARENESS: empathy, acknowledgment of others' feelings, perspective-taking.
4. RELATIONSHIP MANAGEMENT: collaborative language, constructive suggestions.

TASK 2 - Respond AS {name}, staying completely in character:
- React realistically based on your persona and how the user just spoke to you
- Keep the reply to 1-3 sentences, natural and conversational
- Do NOT break character or mention you're an AI

Respond in this EXACT JSON format only (no markdown, no extra text):
{{
  "selfAwareness": <number 0-100>,
  "selfManagement": <number 0-100>,
  "socialAwareness": <number 0-100>,
  "relationshipManagement": <number 0-100>,
  "feedback": "<one specific, encouraging sentence>",
  "characterResponse": "<{name}'s reply, 1-3 sentences>"
}}"#,
        title = scenario.title,
        context = scenario.context,
        objective = scenario.user_objective,
        name = scenario.character_name,
        persona = scenario.character_persona,
        conversation = transcript(history, &scenario.character_name),
        message = message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EqScores;

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

    #[test]
    fn hint_prompt_uses_last_four_messages_and_weakest_dimension() {
        let history: Vec<ConversationMessage> = (0..6)
            .map(|i| ConversationMessage::user(format!("message {i}")))
            .collect();
        let scores = EqScores {
            self_awareness: 80.0,
            self_management: 30.0,
            social_awareness: 60.0,
            relationship_management: 70.0,
        };
        let prompt = coach_hint_prompt(&scenario(), &history, &scores);
        assert!(!prompt.contains("message 1"));
        assert!(prompt.contains("message 2"));
        assert!(prompt.contains("message 5"));
        assert!(prompt.contains("selfManagement"));
        assert!(prompt.contains("score: 30/100"));
    }

    #[test]
    fn character_prompt_labels_speakers() {
        let history = vec![
            ConversationMessage::character("Hey!"),
            ConversationMessage::user("We need to talk."),
        ];
        let prompt = character_response_prompt("I feel hurt.", &scenario(), &history);
        assert!(prompt.contains("Alex: Hey!"));
        assert!(prompt.contains("User: We need to talk."));
        assert!(prompt.ends_with("Alex:"));
    }

    #[test]
    fn combined_prompt_requests_both_outputs() {
        let prompt = combined_prompt("I feel hurt.", &scenario(), &[]);
        assert!(prompt.contains("\"characterResponse\""));
        assert!(prompt.contains("\"selfAwareness\""));
    }
}
