#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode};
use axum::routing::{self, post};
use axum::{Form, Json, Router};
use formsync_server::config::{AirtableSettings, ServerConfig};
use formsync_server::router::build_app;
use formsync_server::state::AppState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SIGNUP_FORM: &str = include_str!("../../../form-spec/tests/fixtures/signup_form.json");

/// Test config with safe defaults; Airtable points at an unroutable address.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        frontend_url: "http://localhost:5173/".to_string(),
        request_timeout_secs: 30,
        airtable: AirtableSettings {
            client_id: "test-client".to_string(),
            api_base: "http://127.0.0.1:9/v0".to_string(),
            token_url: "http://127.0.0.1:9/oauth2/v1/token".to_string(),
            ..AirtableSettings::default()
        },
    }
}

/// Builds the app and keeps a handle on its state for seeding and inspection.
pub fn build_test_app(config: ServerConfig) -> (Router, AppState) {
    let state = AppState::new(config).expect("state");
    (build_app(state.clone()), state)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    app.oneshot(request).await.expect("response")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Creates a user through the API and returns its id.
pub async fn create_user(app: &Router, email: &str) -> String {
    let response = post_json(app.clone(), "/api/users", json!({ "email": email })).await;
    let json = body_json(response).await;
    json["user"]["id"].as_str().expect("user id").to_string()
}

/// Creates the signup form for `user_id` and returns its id.
pub async fn create_signup_form(app: &Router, user_id: &str) -> String {
    let mut body: Value = serde_json::from_str(SIGNUP_FORM).expect("fixture");
    body["userId"] = json!(user_id);
    let response = post_json(app.clone(), "/api/forms", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().expect("form id").to_string()
}

/// Requests seen by the fake Airtable API.
#[derive(Debug, Default)]
pub struct AirtableLog {
    pub token_grants: Vec<String>,
    pub spent_refresh_tokens: Vec<String>,
    pub records: Vec<(String, Value)>,
}

#[derive(Clone, Default)]
struct FakeAirtable {
    log: Arc<Mutex<AirtableLog>>,
}

/// Stand-in for the Airtable OAuth and REST endpoints.
pub struct FakeAirtableServer {
    pub addr: SocketAddr,
    pub log: Arc<Mutex<AirtableLog>>,
}

impl FakeAirtableServer {
    pub async fn start() -> Self {
        let fake = FakeAirtable::default();
        let log = fake.log.clone();
        let app = Router::new()
            .route("/oauth2/v1/token", post(fake_token))
            .route("/v0/meta/whoami", routing::get(fake_whoami))
            .route("/v0/meta/bases", routing::get(fake_bases))
            .route("/v0/{base}/{table}", post(fake_create_record))
            .with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake airtable");
        });
        Self { addr, log }
    }

    /// Config whose Airtable endpoints point at this server.
    pub fn config(&self) -> ServerConfig {
        let mut config = test_config();
        config.airtable.api_base = format!("http://{}/v0", self.addr);
        config.airtable.token_url = format!("http://{}/oauth2/v1/token", self.addr);
        config
    }
}

/// Refresh tokens rotate: each one is accepted once, like Airtable's.
async fn fake_token(
    State(fake): State<FakeAirtable>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let grant = params.get("grant_type").cloned().unwrap_or_default();
    let mut log = fake.log.lock().expect("log");
    let access_token = if grant == "refresh_token" {
        let presented = params.get("refresh_token").cloned().unwrap_or_default();
        if log.spent_refresh_tokens.contains(&presented) {
            return Err(StatusCode::BAD_REQUEST);
        }
        log.spent_refresh_tokens.push(presented);
        "tok-refreshed"
    } else {
        "tok-initial"
    };
    log.token_grants.push(grant);
    let next_refresh = format!("refresh-{}", log.token_grants.len());
    Ok(Json(json!({
        "access_token": access_token,
        "refresh_token": next_refresh,
        "expires_in": 3600,
        "scope": "data.records:read data.records:write"
    })))
}

async fn fake_whoami(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer tok-"));
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({ "id": "usrFake", "email": "Owner@Example.com" })))
}

async fn fake_bases() -> Json<Value> {
    Json(json!({
        "bases": [{ "id": "appQ1w2e3r4t5y6u7", "name": "Signups", "permissionLevel": "create" }]
    }))
}

async fn fake_create_record(
    State(fake): State<FakeAirtable>,
    Path((base, table)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if base != "appQ1w2e3r4t5y6u7" || table != "tblA1s2d3f4g5h6j7" {
        return Err(StatusCode::NOT_FOUND);
    }
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    fake.log.lock().expect("log").records.push((auth, body.clone()));
    Ok(Json(json!({ "id": "recFake1", "fields": body["fields"] })))
}
