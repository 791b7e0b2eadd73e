use axum::extract::State;
use axum::{Json, Router, routing::post};
use form_spec::AnswerMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEvent {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub fields: AnswerMap,
}

/// POST /api/webhooks/airtable
///
/// Unrecognised event types are acknowledged without touching any response.
async fn airtable_event(
    State(state): State<AppState>,
    Json(event): Json<RecordEvent>,
) -> AppResult<Json<Value>> {
    let record_id = event
        .record_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing recordId in webhook".into()))?;

    let matched = match event.kind.as_str() {
        "record.deleted" => state.store.mark_record_deleted(&record_id).await,
        "record.updated" => state.store.sync_record_fields(&record_id, &event.fields).await,
        other => {
            tracing::debug!(kind = other, record_id = %record_id, "Ignoring webhook event");
            0
        }
    };
    tracing::info!(kind = %event.kind, record_id = %record_id, matched, "Webhook processed");

    Ok(Json(json!({ "ok": true, "matched": matched })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/airtable", post(airtable_event))
}
