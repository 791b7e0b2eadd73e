use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Airtable OAuth client registration and endpoints.
#[derive(Debug, Clone)]
pub struct AirtableSettings {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub api_base: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            redirect_uri: "http://localhost:5000/api/auth/airtable/callback".into(),
            api_base: "https://api.airtable.com/v0".into(),
            authorize_url: "https://airtable.com/oauth2/v1/authorize".into(),
            token_url: "https://airtable.com/oauth2/v1/token".into(),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                  | Default                                             |
/// |--------------------------|-----------------------------------------------------|
/// | `HOST`                   | `0.0.0.0`                                           |
/// | `PORT`                   | `5000`                                              |
/// | `CORS_ORIGINS`           | `http://localhost:5173`                             |
/// | `FRONTEND_URL`           | `http://localhost:5173`                             |
/// | `REQUEST_TIMEOUT_SECS`   | `30`                                                |
/// | `AIRTABLE_CLIENT_ID`     | empty (OAuth login disabled)                        |
/// | `AIRTABLE_CLIENT_SECRET` | unset                                               |
/// | `AIRTABLE_REDIRECT_URI`  | `http://localhost:5000/api/auth/airtable/callback`  |
/// | `AIRTABLE_API_BASE`      | `https://api.airtable.com/v0`                       |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Where the OAuth callback sends the browser once the account is linked.
    pub frontend_url: String,
    pub request_timeout_secs: u64,
    pub airtable: AirtableSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".into()],
            frontend_url: "http://localhost:5173".into(),
            request_timeout_secs: 30,
            airtable: AirtableSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let airtable_defaults = AirtableSettings::default();

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        let airtable = AirtableSettings {
            client_id: env_or("AIRTABLE_CLIENT_ID", airtable_defaults.client_id),
            client_secret: std::env::var("AIRTABLE_CLIENT_SECRET")
                .ok()
                .filter(|secret| !secret.is_empty()),
            redirect_uri: env_or("AIRTABLE_REDIRECT_URI", airtable_defaults.redirect_uri),
            api_base: env_or("AIRTABLE_API_BASE", airtable_defaults.api_base),
            ..airtable_defaults
        };

        Ok(Self {
            host: env_or("HOST", defaults.host),
            port: parse_env("PORT", defaults.port)?,
            cors_origins,
            frontend_url: env_or("FRONTEND_URL", defaults.frontend_url),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            airtable,
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}
