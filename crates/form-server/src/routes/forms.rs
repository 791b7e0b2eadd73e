use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{
    Json, Router,
    routing::{get, post},
};
use form_spec::{FormSpec, QuestionSpec, answers_from_value, build_render_payload, lint, render_json_ui};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateForm {
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub airtable_base_id: String,
    #[serde(default)]
    pub airtable_table_id: String,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub answers: Value,
}

/// POST /api/forms
///
/// Rejects definitions with structural problems (bad Airtable ids, duplicate
/// keys, rules that reference unknown or later questions).
async fn create_form(
    State(state): State<AppState>,
    Json(input): Json<CreateForm>,
) -> AppResult<impl IntoResponse> {
    let owner_id = input
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".into()))?;
    state
        .store
        .get_user(&owner_id)
        .await
        .ok_or(AppError::NotFound("User"))?;

    let spec = FormSpec {
        id: String::new(),
        title: input.title,
        description: input.description,
        airtable_base_id: input.airtable_base_id,
        airtable_table_id: input.airtable_table_id,
        questions: input.questions,
    };

    let issues = lint(&spec);
    if !issues.is_empty() {
        return Err(AppError::Validation(
            issues.iter().map(ToString::to_string).collect(),
        ));
    }

    let form = state.store.create_form(spec, &owner_id).await;
    tracing::info!(
        form_id = %form.spec.id,
        owner_id = %owner_id,
        questions = form.spec.questions.len(),
        "Form created",
    );
    Ok((StatusCode::CREATED, Json(form)))
}

/// GET /api/forms/{id}
async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let form = state
        .store
        .get_form(&id)
        .await
        .ok_or(AppError::NotFound("Form"))?;
    Ok(Json(form))
}

/// GET /api/forms/{id}/responses
async fn list_responses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state
        .store
        .get_form(&id)
        .await
        .ok_or(AppError::NotFound("Form"))?;
    let responses = state.store.responses_for_form(&id).await;
    Ok(Json(json!({ "responses": responses })))
}

/// POST /api/forms/{id}/render
///
/// Reports which questions to display for the answers collected so far.
async fn render_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RenderRequest>,
) -> AppResult<impl IntoResponse> {
    let form = state
        .store
        .get_form(&id)
        .await
        .ok_or(AppError::NotFound("Form"))?;
    let answers = answers_from_value(&input.answers);
    let payload = build_render_payload(&form.spec, &answers);
    Ok(Json(render_json_ui(&payload)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_form))
        .route("/{id}", get(get_form))
        .route("/{id}/responses", get(list_responses))
        .route("/{id}/render", post(render_form))
}
