use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::Principal;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("encode: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("decode: {0}")]
    Decode(jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing keys for application tokens.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Sign a token for `principal`, valid for the configured TTL.
    pub fn issue_token(&self, principal: &Principal) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            username: principal.username.clone(),
            role: principal.role.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(JwtError::Encode)
    }

    /// Verify signature and expiry and return the embedded principal.
    pub fn verify_token(&self, token: &str) -> Result<Principal, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(JwtError::Decode)?;
        Ok(Principal {
            username: data.claims.username,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn alice() -> Principal {
        Principal {
            username: "alice@example.com".to_string(),
            role: "user".to_string(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = JwtKeys::new(SECRET, 7200);
        let token = keys.issue_token(&alice()).unwrap();
        assert_eq!(keys.verify_token(&token).unwrap(), alice());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtKeys::new(SECRET, 7200).issue_token(&alice()).unwrap();
        let other = JwtKeys::new("fedcba9876543210fedcba9876543210", 7200);
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = JwtKeys::new(SECRET, 7200);
        let now = Utc::now().timestamp();
        let claims = Claims {
            username: "bob".to_string(),
            role: "admin".to_string(),
            iat: now - 7200,
            exp: now - 60,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let keys = JwtKeys::new(SECRET, 7200);
        assert!(keys.verify_token("not-a-jwt").is_err());
    }
}
