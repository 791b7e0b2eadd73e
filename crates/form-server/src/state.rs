use std::sync::Arc;
use std::time::Duration;

use crate::airtable::{AirtableClient, AirtableError};
use crate::config::ServerConfig;
use crate::oauth::{PendingLogins, RefreshLocks};
use crate::store::MemoryStore;

/// Shared application state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<MemoryStore>,
    pub airtable: AirtableClient,
    pub logins: Arc<PendingLogins>,
    pub refresh_locks: Arc<RefreshLocks>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, AirtableError> {
        let airtable = AirtableClient::new(
            config.airtable.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(MemoryStore::new()),
            airtable,
            logins: Arc::new(PendingLogins::new()),
            refresh_locks: Arc::new(RefreshLocks::new()),
        })
    }
}
