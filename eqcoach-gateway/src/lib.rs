//! HTTP surface for the EQ conversation coach.
//!
//! One inbound operation: `POST /api/chat` with an `action` discriminator
//! in the JSON body, mirroring the shape the web client sends. Sessions are
//! client-resident; this service is stateless per request apart from the
//! credential cursors living inside the orchestrator.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use eqcoach::{
    Action, ConversationMessage, EqScore, EqScores, Scenario, TurnProcessor,
};

#[derive(Clone)]
pub struct AppState {
    processor: Arc<TurnProcessor>,
}

impl AppState {
    pub fn new(processor: Arc<TurnProcessor>) -> Self {
        AppState { processor }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
}

/// Inbound chat request. Everything past `action` is optional at the wire
/// level; each action validates what it actually needs.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    action: Option<String>,
    message: Option<String>,
    scenario: Option<Scenario>,
    #[serde(default)]
    conversation_history: Vec<ConversationMessage>,
    /// Older clients send `eqScores`, newer ones `currentEQScores`.
    #[serde(default, alias = "currentEQScores")]
    eq_scores: Option<Vec<EqScore>>,
}

type ApiResponse = (StatusCode, Json<serde_json::Value>);

fn bad_request(message: &str) -> ApiResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error() -> ApiResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResponse {
    let action = match &request.action {
        Some(action) => action.as_str(),
        None => return bad_request("Missing action"),
    };
    let action = match Action::parse(action) {
        Some(action) => action,
        None => return bad_request("Invalid action"),
    };
    let scenario = match &request.scenario {
        Some(scenario) => scenario,
        None => return bad_request("Missing scenario"),
    };
    let history = &request.conversation_history;
    let scores = request
        .eq_scores
        .as_deref()
        .map(EqScores::from_entries)
        .unwrap_or_default();

    let result = match action {
        Action::AnalyzeEq => {
            let Some(message) = request.message.as_deref() else {
                return bad_request("Missing message");
            };
            state
                .processor
                .analyze_eq(message, scenario)
                .await
                .map(|analysis| json!(analysis))
        }
        Action::GenerateResponse => {
            let Some(message) = request.message.as_deref() else {
                return bad_request("Missing message");
            };
            state
                .processor
                .generate_character_response(message, scenario, history)
                .await
                .map(|response| json!({ "response": response }))
        }
        Action::GetHint => state
            .processor
            .get_coach_hint(scenario, history, &scores)
            .await
            .map(|hint| json!({ "hint": hint })),
        Action::GetImprovements => state
            .processor
            .get_improvement_suggestions(scenario, &scores, history)
            .await
            .map(|suggestions| json!({ "suggestions": suggestions })),
        Action::AnalyzeAndRespond => {
            let Some(message) = request.message.as_deref() else {
                return bad_request("Missing message");
            };
            state
                .processor
                .analyze_and_respond(message, scenario, history)
                .await
                .map(|outcome| {
                    json!({
                        "eqAnalysis": outcome.eq_analysis,
                        "characterResponse": outcome.character_response,
                    })
                })
        }
    };

    match result {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(error) => {
            tracing::error!(action = action.as_str(), %error, "chat action failed");
            internal_error()
        }
    }
}
