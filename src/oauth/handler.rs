use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::google::FrontendUser;
use super::OAuthState;
use crate::auth::{Principal, ROLE_USER};
use crate::error::{AppError, AppResult};

#[derive(Serialize)]
pub struct LoginUrlResponse {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

/// GET /auth/google/login - Issue a state token and return the Google consent URL.
pub async fn google_login(State(state): State<Arc<OAuthState>>) -> AppResult<Json<LoginUrlResponse>> {
    let google = state.google.as_ref().ok_or(AppError::OAuthUnavailable)?;
    let token = state.states.issue();
    Ok(Json(LoginUrlResponse {
        url: google.authorization_url(&token),
    }))
}

/// GET /auth/google/callback - Validate state, finish the code exchange and
/// hand an application token to the frontend.
pub async fn google_callback(
    State(state): State<Arc<OAuthState>>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Redirect> {
    let google = state.google.as_ref().ok_or(AppError::OAuthUnavailable)?;

    state.states.consume(&params.state).map_err(|e| {
        tracing::info!("oauth callback rejected: invalid or expired state");
        AppError::from(e)
    })?;

    let access_token = google.exchange_code(&params.code).await?;
    let user = google.fetch_user(&access_token).await?;

    let principal = Principal {
        username: user.email.clone(),
        role: ROLE_USER.to_string(),
    };
    let token = state.jwt.issue_token(&principal)?;

    let user_json = serde_json::to_vec(&FrontendUser::from(&user))
        .map_err(|e| AppError::Internal(format!("serialize user: {e}")))?;

    tracing::info!(email = %user.email, "google sign-in succeeded");
    Ok(Redirect::temporary(&frontend_callback_url(
        &state.frontend_url,
        &token,
        &user_json,
    )))
}

/// `{frontend}/auth/callback?token=<escaped jwt>&user=<base64url user json>`
fn frontend_callback_url(frontend_url: &str, token: &str, user_json: &[u8]) -> String {
    let token: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
    format!(
        "{}/auth/callback?token={}&user={}",
        frontend_url.trim_end_matches('/'),
        token,
        URL_SAFE.encode(user_json)
    )
}
