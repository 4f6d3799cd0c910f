pub mod google;
pub mod handler;
pub mod state;

pub use google::GoogleClient;
pub use state::OAuthStateManager;

use std::sync::Arc;

use crate::auth::jwt::JwtKeys;

/// Shared state for the Google sign-in endpoints.
pub struct OAuthState {
    pub states: Arc<OAuthStateManager>,
    /// `None` when client credentials are not configured (public-only mode).
    pub google: Option<Arc<GoogleClient>>,
    pub jwt: Arc<JwtKeys>,
    pub frontend_url: String,
}
