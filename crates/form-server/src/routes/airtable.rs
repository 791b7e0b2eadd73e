use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::Value;

use crate::airtable::AirtableError;
use crate::error::{AppError, AppResult};
use crate::models::{AirtableAuth, ConnectedBase};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

async fn stored_auth(state: &AppState, user_id: &str) -> AppResult<AirtableAuth> {
    let user = state
        .store
        .get_user(user_id)
        .await
        .ok_or(AppError::NotFound("User"))?;
    Ok(user.airtable.ok_or(AirtableError::NotConnected)?)
}

/// Returns a usable access token for the user, refreshing it first when it
/// is about to expire.
///
/// Refreshes are serialized per user: Airtable rotates refresh tokens, so a
/// second concurrent refresh with the same token would be rejected.
pub(crate) async fn access_token_for(state: &AppState, user_id: &str) -> AppResult<String> {
    let auth = stored_auth(state, user_id).await?;
    if !auth.needs_refresh() {
        return Ok(auth.access_token);
    }

    let lock = state.refresh_locks.for_user(user_id);
    let _guard = lock.lock().await;
    // Re-read: another request may have refreshed while this one waited.
    let auth = stored_auth(state, user_id).await?;
    if !auth.needs_refresh() {
        return Ok(auth.access_token);
    }
    let Some(refresh_token) = auth.refresh_token.as_deref() else {
        return Ok(auth.access_token);
    };

    tracing::debug!(user_id, "Refreshing Airtable access token");
    let token = state.airtable.refresh(refresh_token).await?;
    let refreshed = auth.refreshed(token);
    let access_token = refreshed.access_token.clone();
    state.store.set_airtable_auth(user_id, refreshed).await;
    Ok(access_token)
}

fn required_user(query: UserQuery) -> AppResult<String> {
    query
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".into()))
}

fn connected_bases(bases: &Value) -> Vec<ConnectedBase> {
    bases
        .get("bases")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|base| {
                    Some(ConnectedBase {
                        base_id: base.get("id")?.as_str()?.to_string(),
                        base_name: base
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// GET /api/airtable/bases?userId=
async fn list_bases(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = required_user(query)?;
    let token = access_token_for(&state, &user_id).await?;
    let bases = state.airtable.list_bases(&token).await?;
    state
        .store
        .set_connected_bases(&user_id, connected_bases(&bases))
        .await;
    Ok(Json(bases))
}

/// GET /api/airtable/bases/{base_id}/tables?userId=
async fn list_tables(
    State(state): State<AppState>,
    Path(base_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = required_user(query)?;
    let token = access_token_for(&state, &user_id).await?;
    let tables = state.airtable.list_tables(&token, &base_id).await?;
    Ok(Json(tables))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bases", get(list_bases))
        .route("/bases/{base_id}/tables", get(list_tables))
}
