pub mod airtable;
pub mod auth;
pub mod forms;
pub mod health;
pub mod logic;
pub mod responses;
pub mod users;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /health                                  service health
/// /users, /users/{id}                      create (idempotent on email), list, get
/// /forms, /forms/{id}                      create, get
/// /forms/{id}/responses                    responses, newest first
/// /forms/{id}/render                       visible questions for in-progress answers
/// /responses                               submit answers
/// /auth/airtable/login                     OAuth consent URL
/// /auth/airtable/callback                  OAuth redirect target
/// /airtable/bases                          bases of the connected account
/// /airtable/bases/{base_id}/tables         tables and fields of a base
/// /webhooks/airtable                       record update/delete notifications
/// /test-logic                              evaluate a rule set
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/users", users::router())
        .nest("/forms", forms::router())
        .nest("/responses", responses::router())
        .nest("/auth", auth::router())
        .nest("/airtable", airtable::router())
        .nest("/webhooks", webhooks::router())
        .merge(logic::router())
}
