use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::bearer::{generate_token, hash_token};

/// Default lifetime of an issued state token.
pub const DEFAULT_STATE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Unknown, expired and already-consumed tokens are deliberately the same error.
    #[error("invalid or expired state")]
    InvalidOrExpired,
}

/// One-time anti-forgery tokens for the Google sign-in redirect.
///
/// Tokens are stored by SHA-256 digest with their expiry. A token is valid from
/// issue until `expires_at` inclusive and is removed by the first `consume`.
pub struct OAuthStateManager {
    states: Mutex<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
}

impl OAuthStateManager {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Issue a fresh token and sweep anything already expired.
    pub fn issue(&self) -> String {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> String {
        let token = generate_token();
        let mut states = self.lock();
        states.insert(hash_token(&token), now + self.ttl);
        let swept = sweep(&mut states, now);
        if swept > 0 {
            tracing::debug!(swept, "removed expired oauth states");
        }
        token
    }

    /// Validate and remove `token`. Succeeds at most once per issued token.
    pub fn consume(&self, token: &str) -> Result<(), StateError> {
        self.consume_at(token, Utc::now())
    }

    pub fn consume_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), StateError> {
        let key = hash_token(token);
        // Removal happens unconditionally so unknown and expired tokens take the same path.
        let expires_at = self.lock().remove(&key);
        match expires_at {
            Some(expires_at) if now <= expires_at => Ok(()),
            _ => Err(StateError::InvalidOrExpired),
        }
    }

    /// Drop every token whose expiry has passed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        sweep(&mut self.lock(), now)
    }

    /// Number of tokens currently held, expired ones included.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OAuthStateManager {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_TTL_SECS)
    }
}

fn sweep(states: &mut HashMap<String, DateTime<Utc>>, now: DateTime<Utc>) -> usize {
    let before = states.len();
    states.retain(|_, expires_at| now <= *expires_at);
    before - states.len()
}

/// Periodically sweep expired states between sign-in attempts.
pub async fn state_sweep_loop(manager: std::sync::Arc<OAuthStateManager>, interval_secs: u64) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
    loop {
        interval.tick().await;
        let removed = manager.sweep_expired();
        if removed > 0 {
            tracing::debug!(removed, "swept expired oauth states");
        }
    }
}
