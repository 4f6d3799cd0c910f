use std::sync::Arc;

use super::jwt::JwtKeys;
use super::users::UserStore;
use crate::config::{default_users, AuthConfig};

/// Shared state for local login.
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<UserStore>,
    pub jwt: Arc<JwtKeys>,
}

impl AuthState {
    pub fn new(config: &AuthConfig) -> Self {
        if config.users == default_users() {
            tracing::warn!("using built-in demo accounts; configure auth.users for production");
        }
        let users = UserStore::new(config.users.clone());
        if users.is_empty() {
            tracing::warn!("no local accounts configured; POST /login will reject every request");
        } else {
            tracing::info!(accounts = users.len(), "local accounts loaded");
        }
        Self {
            users: Arc::new(users),
            jwt: Arc::new(JwtKeys::new(&config.jwt_secret, config.token_ttl_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config(users: Vec<crate::config::UserEntry>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            token_ttl_secs: 7200,
            users,
        }
    }

    #[test]
    fn test_default_accounts_loaded() {
        let state = AuthState::new(&auth_config(default_users()));
        assert_eq!(state.users.len(), 2);
        assert!(state.users.authenticate("admin", "adminpass").is_some());
    }

    #[test]
    fn test_no_accounts_rejects_everyone() {
        let state = AuthState::new(&auth_config(Vec::new()));
        assert!(state.users.is_empty());
        assert!(state.users.authenticate("admin", "adminpass").is_none());
    }
}
