use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::post};
use form_spec::{answers_from_value, validate};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::{AppError, AppResult};
use crate::models::{Form, ResponseSource};
use crate::routes::airtable::access_token_for;
use crate::state::AppState;
use crate::store::NewResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub answers: Option<Value>,
}

/// POST /api/responses
///
/// Answers to hidden questions are ignored and never stored. The Airtable
/// push is best effort: the response is kept even when it fails.
async fn submit_response(
    State(state): State<AppState>,
    Json(input): Json<SubmitResponse>,
) -> AppResult<impl IntoResponse> {
    let (Some(form_id), Some(answers)) = (
        input.form_id.filter(|id| !id.is_empty()),
        input.answers.filter(|answers| !answers.is_null()),
    ) else {
        return Err(AppError::BadRequest("formId and answers are required".into()));
    };

    let form = state
        .store
        .get_form(&form_id)
        .await
        .ok_or(AppError::NotFound("Form"))?;

    let answers = answers_from_value(&answers);
    let result = validate(&form.spec, &answers);
    if !result.valid {
        tracing::debug!(form_id = %form_id, errors = result.errors.len(), "Submission rejected");
        return Err(AppError::Validation(result.messages()));
    }
    if !result.unknown_fields.is_empty() {
        tracing::debug!(form_id = %form_id, unknown = ?result.unknown_fields, "Ignoring unknown answer keys");
    }

    let pushed = push_to_airtable(&state, &form, &result.fields).await;
    let (airtable_record_id, message) = match pushed {
        Push::Saved(record_id) => (Some(record_id), "Response saved to Airtable"),
        Push::Failed => (None, "Response saved, but failed to save to Airtable"),
        Push::Skipped => (None, "Response saved (no Airtable connection)"),
    };

    let response = state
        .store
        .insert_response(NewResponse {
            form_id,
            owner_id: form.owner_id.clone(),
            airtable_record_id,
            answers: result.answers,
            source: ResponseSource::Webform,
        })
        .await;
    tracing::info!(response_id = %response.id, form_id = %response.form_id, "Response stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": message, "response": response })),
    ))
}

enum Push {
    Saved(String),
    Failed,
    Skipped,
}

async fn push_to_airtable(state: &AppState, form: &Form, fields: &Map<String, Value>) -> Push {
    let spec = &form.spec;
    if spec.airtable_base_id.is_empty() || spec.airtable_table_id.is_empty() {
        return Push::Skipped;
    }
    let Some(owner) = state.store.get_user(&form.owner_id).await else {
        return Push::Skipped;
    };
    if owner.airtable.is_none() {
        return Push::Skipped;
    }

    let token = match access_token_for(state, &owner.id).await {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(form_id = %spec.id, error = %err, "Could not obtain Airtable token");
            return Push::Failed;
        }
    };

    match state
        .airtable
        .create_record(&token, &spec.airtable_base_id, &spec.airtable_table_id, fields)
        .await
    {
        Ok(record) => {
            tracing::info!(form_id = %spec.id, record_id = %record.id, "Record created in Airtable");
            Push::Saved(record.id)
        }
        Err(err) => {
            tracing::warn!(form_id = %spec.id, error = %err, "Failed to save response to Airtable");
            Push::Failed
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_response))
}
