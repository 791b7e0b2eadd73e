//! Thin client for the parts of the Airtable API the service uses: the OAuth
//! token endpoint, `whoami`, schema metadata, and record creation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;
use url::Url;

use crate::config::AirtableSettings;

pub const OAUTH_SCOPES: &str =
    "data.records:read data.records:write schema.bases:read user.email:read";

#[derive(Debug, Error)]
pub enum AirtableError {
    #[error("Airtable OAuth is not configured")]
    NotConfigured,
    #[error("User not connected to Airtable")]
    NotConnected,
    #[error("invalid Airtable URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Airtable transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Airtable responded with {status}: {body}")]
    Api { status: StatusCode, body: String },
}

/// Token endpoint response for both code exchange and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmI {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRecord {
    pub id: String,
}

#[derive(Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    settings: Arc<AirtableSettings>,
}

impl AirtableClient {
    pub fn new(settings: AirtableSettings, timeout: Duration) -> Result<Self, AirtableError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("formsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            settings: Arc::new(settings),
        })
    }

    /// Builds the consent URL the browser is sent to.
    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<String, AirtableError> {
        if self.settings.client_id.is_empty() {
            return Err(AirtableError::NotConfigured);
        }
        let url = Url::parse_with_params(
            &self.settings.authorize_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", OAUTH_SCOPES),
                ("state", state),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
            ],
        )?;
        Ok(url.into())
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, AirtableError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", code_verifier),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ])
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AirtableError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AirtableError> {
        if self.settings.client_id.is_empty() {
            return Err(AirtableError::NotConfigured);
        }
        let mut form: Vec<(&str, &str)> = params.to_vec();
        let request = self.http.post(&self.settings.token_url);
        // Confidential clients authenticate with basic auth; public clients send their id.
        let request = match &self.settings.client_secret {
            Some(secret) => request.basic_auth(&self.settings.client_id, Some(secret)),
            None => {
                form.push(("client_id", self.settings.client_id.as_str()));
                request
            }
        };
        send_json(request.form(&form)).await
    }

    pub async fn whoami(&self, token: &str) -> Result<WhoAmI, AirtableError> {
        send_json(self.get(token, "/meta/whoami")).await
    }

    pub async fn list_bases(&self, token: &str) -> Result<Value, AirtableError> {
        send_json(self.get(token, "/meta/bases")).await
    }

    pub async fn list_tables(&self, token: &str, base_id: &str) -> Result<Value, AirtableError> {
        send_json(self.get(token, &format!("/meta/bases/{base_id}/tables"))).await
    }

    pub async fn create_record(
        &self,
        token: &str,
        base_id: &str,
        table_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<CreatedRecord, AirtableError> {
        let request = self
            .http
            .post(self.api_url(&format!("/{base_id}/{table_id}")))
            .bearer_auth(token)
            .json(&json!({ "fields": fields }));
        send_json(request).await
    }

    fn get(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.get(self.api_url(path)).bearer_auth(token)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_base.trim_end_matches('/'), path)
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AirtableError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AirtableError::Api { status, body });
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(client_id: &str) -> AirtableClient {
        let settings = AirtableSettings {
            client_id: client_id.into(),
            ..AirtableSettings::default()
        };
        AirtableClient::new(settings, Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn authorize_url_carries_state_and_challenge() {
        let url = client("abc").authorize_url("s123", "chal").expect("url");
        let parsed = Url::parse(&url).expect("parse");
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("state".into(), "s123".into())));
        assert!(pairs.contains(&("code_challenge".into(), "chal".into())));
        assert!(pairs.contains(&("scope".into(), OAUTH_SCOPES.into())));
        assert!(url.starts_with("https://airtable.com/oauth2/v1/authorize?"));
    }

    #[test]
    fn authorize_url_requires_client_id() {
        assert!(matches!(
            client("").authorize_url("s", "c"),
            Err(AirtableError::NotConfigured)
        ));
    }

    #[test]
    fn api_url_joins_base_and_path() {
        let mut settings = AirtableSettings::default();
        settings.api_base = "http://127.0.0.1:9/v0/".into();
        let client = AirtableClient::new(settings, Duration::from_secs(1)).expect("client");
        assert_eq!(client.api_url("/meta/bases"), "http://127.0.0.1:9/v0/meta/bases");
    }
}
