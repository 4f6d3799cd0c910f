use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::jwt::JwtKeys;
use super::{Principal, ROLE_ADMIN};

/// SHA-256 hash of a plaintext token, returned as hex.
pub fn hash_token(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random URL-safe token with 256 bits of entropy.
pub fn generate_token() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Extract the token from the Authorization header. Accepts both
/// `Bearer <token>` and a bare token.
fn extract_bearer(req: &Request<Body>) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({"error": "unauthorized"})),
    )
        .into_response()
}

/// Middleware: validates the JWT and injects the `Principal` into extensions.
pub async fn require_auth(request: Request<Body>, next: Next) -> Result<Response, Response> {
    let keys = request
        .extensions()
        .get::<Arc<JwtKeys>>()
        .cloned()
        .ok_or_else(|| {
            (StatusCode::INTERNAL_SERVER_ERROR, "jwt keys not configured").into_response()
        })?;

    let token = extract_bearer(&request).ok_or_else(unauthorized)?;

    let principal = keys.verify_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        unauthorized()
    })?;

    let mut request = request;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Middleware: requires an admin `Principal`. Must run after `require_auth`.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, Response> {
    let is_admin = request
        .extensions()
        .get::<Principal>()
        .is_some_and(|p| p.role == ROLE_ADMIN);

    if !is_admin {
        return Err((
            StatusCode::FORBIDDEN,
            axum::Json(serde_json::json!({"error": "forbidden"})),
        )
            .into_response());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_deterministic() {
        let hash1 = hash_token("test-token-abc");
        let hash2 = hash_token("test-token-abc");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_token_different_inputs() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn test_hash_token_is_hex() {
        let hash = hash_token("anything");
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.len(), 64); // SHA-256 = 32 bytes = 64 hex chars
    }

    #[test]
    fn test_generate_token_length() {
        // base64url(32 bytes) without padding = 43 chars
        assert_eq!(generate_token().len(), 43);
    }

    #[test]
    fn test_generate_token_uniqueness() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_extract_bearer_accepts_prefix_and_bare() {
        let with_prefix = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer(&with_prefix).as_deref(), Some("abc.def"));

        let bare = Request::builder()
            .header(header::AUTHORIZATION, "abc.def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer(&bare).as_deref(), Some("abc.def"));

        let empty = Request::builder()
            .header(header::AUTHORIZATION, "Bearer ")
            .body(Body::empty())
            .unwrap();
        assert!(extract_bearer(&empty).is_none());
    }
}
