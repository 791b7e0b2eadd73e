use axum::{Json, Router, routing::post};
use form_spec::{RuleSet, answers_from_value, should_show};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogicTest {
    #[serde(default)]
    pub conditions: Option<RuleSet>,
    #[serde(default)]
    pub answers: Value,
}

/// POST /api/test-logic
///
/// Evaluates a rule set against ad-hoc answers; handy when designing forms.
async fn test_logic(Json(input): Json<LogicTest>) -> Json<Value> {
    let answers = answers_from_value(&input.answers);
    let visible = should_show(input.conditions.as_ref(), &answers);

    Json(json!({
        "visible": visible,
        "conditions": input.conditions,
        "answers": answers,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/test-logic", post(test_logic))
}
