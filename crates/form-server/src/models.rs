use chrono::{DateTime, Duration, Utc};
use form_spec::{AnswerMap, FormSpec};
use serde::{Deserialize, Serialize};

use crate::airtable::{TokenResponse, WhoAmI};

/// Airtable OAuth credentials held for a user. Tokens never leave the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirtableAuth {
    pub airtable_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub token_expires_at: DateTime<Utc>,
    pub scopes: Vec<String>,
    pub last_login_at: DateTime<Utc>,
}

impl AirtableAuth {
    pub fn from_token(token: TokenResponse, who: &WhoAmI) -> Self {
        let now = Utc::now();
        Self {
            airtable_user_id: who.id.clone(),
            email: who.email.clone(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_expires_at: now + Duration::seconds(token.expires_in.unwrap_or(0)),
            scopes: split_scopes(token.scope.as_deref()),
            last_login_at: now,
        }
    }

    /// Applies a refreshed token, keeping the old refresh token if none was issued.
    pub fn refreshed(&self, token: TokenResponse) -> Self {
        let now = Utc::now();
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or_else(|| self.refresh_token.clone()),
            token_expires_at: now + Duration::seconds(token.expires_in.unwrap_or(0)),
            scopes: match token.scope {
                Some(scope) => split_scopes(Some(&scope)),
                None => self.scopes.clone(),
            },
            ..self.clone()
        }
    }

    /// True when the access token is expired or about to expire.
    pub fn needs_refresh(&self) -> bool {
        self.token_expires_at <= Utc::now() + Duration::seconds(60)
    }
}

fn split_scopes(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedBase {
    pub base_id: String,
    pub base_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airtable: Option<AirtableAuth>,
    pub connected_bases: Vec<ConnectedBase>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored form definition and its owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(flatten)]
    pub spec: FormSpec,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Webform,
    Airtable,
    Api,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: String,
    pub form_id: String,
    pub owner_id: String,
    pub airtable_record_id: Option<String>,
    pub answers: AnswerMap,
    pub source: ResponseSource,
    pub deleted_in_airtable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
