use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::state::AuthState;
use crate::error::{AppError, AppResult, LoggedJson};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /login - Exchange local credentials for an application token.
pub async fn login(
    State(state): State<Arc<AuthState>>,
    LoggedJson(input): LoggedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let principal = state
        .users
        .authenticate(&input.username, &input.password)
        .ok_or_else(|| {
            tracing::info!(username = %input.username, "login rejected");
            AppError::Auth("invalid credentials".to_string())
        })?;

    let token = state.jwt.issue_token(&principal)?;
    tracing::info!(username = %principal.username, role = %principal.role, "login succeeded");
    Ok(Json(LoginResponse { token }))
}
