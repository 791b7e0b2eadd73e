use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// POST /api/users
///
/// Returns the existing user (200) when the email is already registered.
async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    let email = input
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Email is required".into()))?;

    let (user, created) = state.store.create_user(&email, input.name).await;
    if created {
        tracing::info!(user_id = %user.id, "User created");
        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "User created successfully", "user": user })),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(json!({ "message": "User already exists, returning existing user", "user": user })),
        ))
    }
}

/// GET /api/users
async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    let users = state.store.list_users().await;
    Json(json!({ "users": users }))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .store
        .get_user(&id)
        .await
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(json!({ "user": user })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user))
}
