use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::models::AirtableAuth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// GET /api/auth/airtable/login
async fn login(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let login = state.logins.begin();
    let url = state
        .airtable
        .authorize_url(&login.state, &login.code_challenge)?;
    Ok(Json(json!({ "url": url })))
}

/// GET /api/auth/airtable/callback
///
/// The `state` must match a login started here and is consumed on use.
async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Redirect> {
    let invalid = || AppError::BadRequest("Invalid OAuth state or code".into());
    let code = query.code.filter(|code| !code.is_empty()).ok_or_else(invalid)?;
    let verifier = query
        .state
        .as_deref()
        .and_then(|value| state.logins.take(value))
        .ok_or_else(invalid)?;

    let token = state.airtable.exchange_code(&code, &verifier).await?;
    let who = state.airtable.whoami(&token.access_token).await?;
    let user = state
        .store
        .upsert_airtable_user(AirtableAuth::from_token(token, &who))
        .await;
    tracing::info!(user_id = %user.id, airtable_user_id = %who.id, "Airtable account linked");

    let mut target = Url::parse(&state.config.frontend_url)
        .map_err(|err| AppError::Internal(format!("invalid FRONTEND_URL: {err}")))?;
    target.query_pairs_mut().append_pair("userId", &user.id);
    Ok(Redirect::to(target.as_str()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/airtable/login", get(login))
        .route("/airtable/callback", get(callback))
}
