use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// How long a login attempt may take before its state is discarded.
const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// A login attempt that has been handed to the browser.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub state: String,
    pub code_challenge: String,
}

/// Outstanding OAuth `state` values and their PKCE verifiers.
#[derive(Debug, Default)]
pub struct PendingLogins {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl PendingLogins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> PendingLogin {
        let state = hex::encode(random_bytes::<16>());
        let verifier = URL_SAFE_NO_PAD.encode(random_bytes::<32>());
        let code_challenge = challenge_for(&verifier);

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, (_, created)| created.elapsed() < STATE_TTL);
        entries.insert(state.clone(), (verifier, Instant::now()));

        PendingLogin {
            state,
            code_challenge,
        }
    }

    /// Consumes a state, returning its verifier if it was issued and has not expired.
    pub fn take(&self, state: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .remove(state)
            .filter(|(_, created)| created.elapsed() < STATE_TTL)
            .map(|(verifier, _)| verifier)
    }
}

/// One async lock per user so a token refresh is never run twice at once.
#[derive(Debug, Default)]
pub struct RefreshLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RefreshLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(user_id.to_string()).or_default().clone()
    }
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// S256 PKCE challenge for a verifier.
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
