//! Goal extraction from a scenario's objective text, plus the per-turn
//! satisfaction heuristics.

use crate::types::EqAnalysis;

const MIN_GOAL_LEN: usize = 10;
const MAX_GOALS: usize = 3;

const DEFAULT_GOALS: [&str; 3] = [
    "Express your feelings clearly and respectfully",
    "Listen actively to the other person's perspective",
    "Work collaboratively toward a resolution",
];

/// Splits a free-text objective into at most 3 discrete goal strings.
///
/// Sentence boundaries are preferred, then commas, then " and "; fragments
/// of 10 characters or fewer are discarded as noise. Short objectives are
/// padded up to 3 with default goals.
pub fn parse_objectives(user_objective: &str) -> Vec<String> {
    let mut goals: Vec<String> = Vec::new();

    if user_objective.contains(". ") {
        goals = split_filter(user_objective, ". ");
    }
    if goals.len() < MAX_GOALS && user_objective.contains(", ") {
        let by_comma = split_filter(user_objective, ", ");
        if by_comma.len() >= goals.len() {
            goals = by_comma;
        }
    }
    if goals.len() < MAX_GOALS {
        let by_and = split_filter(user_objective, " and ");
        if by_and.len() > goals.len() {
            goals = by_and;
        }
    }

    let mut goals: Vec<String> = goals.iter().map(|g| tidy(g)).collect();

    goals.truncate(MAX_GOALS);
    while goals.len() < MAX_GOALS {
        match DEFAULT_GOALS.iter().find(|d| !goals.iter().any(|g| g == *d)) {
            Some(next) => goals.push(next.to_string()),
            None => break,
        }
    }
    goals
}

fn split_filter(text: &str, separator: &str) -> Vec<String> {
    text.split(separator)
        .map(|t| t.trim().to_string())
        .filter(|t| t.len() > MIN_GOAL_LEN)
        .collect()
}

/// Trims trailing periods and capitalizes the first letter.
fn tidy(goal: &str) -> String {
    let trimmed = goal.trim().trim_end_matches('.');
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Whether one goal counts as satisfied by the latest user turn.
///
/// Goals are matched by keyword family; each family requires both a
/// matching phrase in the message and a minimum score on the relevant
/// dimension. Goals outside every family fall through to an overall-score
/// threshold.
pub fn objective_satisfied(goal: &str, message: &str, analysis: &EqAnalysis) -> bool {
    let goal = goal.to_lowercase();
    let message = message.to_lowercase();

    if (goal.contains("express") || goal.contains("feel"))
        && (message.contains("i feel") || message.contains("i'm feeling"))
    {
        return analysis.self_awareness >= 60.0;
    }

    if (goal.contains("listen") || goal.contains("perspective"))
        && (message.contains("i understand")
            || message.contains("i hear")
            || message.contains("i see"))
    {
        return analysis.social_awareness >= 60.0;
    }

    if (goal.contains("resolution") || goal.contains("solution"))
        && (message.contains("let's")
            || message.contains("we could")
            || message.contains("how about"))
    {
        return analysis.relationship_management >= 60.0;
    }

    analysis.overall_score >= 70.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analysis(sa: f64, sm: f64, soa: f64, rm: f64) -> EqAnalysis {
        EqAnalysis::from_raw(sa, sm, soa, rm, "ok".to_string())
    }

    #[test]
    fn sentences_split_into_capitalized_goals() {
        let goals = parse_objectives(
            "express how the missed deadline affected you. understand their constraints. agree on a new plan together.",
        );
        assert_eq!(
            goals,
            vec![
                "Express how the missed deadline affected you",
                "Understand their constraints",
                "Agree on a new plan together",
            ]
        );
    }

    #[test]
    fn short_fragments_are_discarded_and_defaults_pad() {
        let goals = parse_objectives("Stay calm. Ok.");
        assert_eq!(goals.len(), 3);
        assert!(goals.contains(&DEFAULT_GOALS[0].to_string()));
    }

    #[test]
    fn and_split_is_used_when_it_finds_more_goals() {
        let goals =
            parse_objectives("express your frustration and propose a concrete path forward");
        assert_eq!(goals[0], "Express your frustration");
        assert_eq!(goals[1], "Propose a concrete path forward");
        assert_eq!(goals.len(), 3);
    }

    #[test]
    fn more_than_three_goals_are_truncated() {
        let goals = parse_objectives(
            "name your feelings honestly. stay calm under pressure. listen to their side fully. propose a shared plan.",
        );
        assert_eq!(goals.len(), 3);
    }

    #[test]
    fn express_goal_requires_phrase_and_score() {
        let goal = "Express your feelings clearly";
        assert!(objective_satisfied(
            goal,
            "I feel overlooked",
            &analysis(70.0, 50.0, 50.0, 50.0)
        ));
        // Phrase present but score too low.
        assert!(!objective_satisfied(
            goal,
            "I feel overlooked",
            &analysis(40.0, 50.0, 50.0, 50.0)
        ));
        // Score high but no "I feel" phrase and overall below 70.
        assert!(!objective_satisfied(
            goal,
            "This was not okay",
            &analysis(80.0, 50.0, 50.0, 50.0)
        ));
    }

    #[test]
    fn unmatched_goal_uses_overall_threshold() {
        let goal = "Keep the meeting on schedule";
        assert!(objective_satisfied(
            goal,
            "anything",
            &analysis(70.0, 70.0, 70.0, 70.0)
        ));
        assert!(!objective_satisfied(
            goal,
            "anything",
            &analysis(60.0, 60.0, 60.0, 60.0)
        ));
    }
}
