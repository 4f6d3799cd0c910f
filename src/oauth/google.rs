use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OAuthConfig;

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Authorization-code client with the auth and token endpoints set.
type GoogleOAuth = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("user info request failed: {0}")]
    UserInfo(reqwest::Error),

    #[error("user info decode failed: {0}")]
    Decode(reqwest::Error),

    #[error("http client error: {0}")]
    Client(reqwest::Error),

    #[error("invalid oauth endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl GoogleError {
    /// Message safe to show to the browser.
    pub fn public_message(&self) -> &'static str {
        match self {
            GoogleError::Exchange(_) => "failed to exchange code for token",
            GoogleError::UserInfo(_) => "failed to get user info",
            GoogleError::Decode(_) => "failed to decode user info",
            GoogleError::Client(_) | GoogleError::Endpoint(_) => "internal server error",
        }
    }
}

/// Profile returned by the Google userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: String,
}

/// Subset of the profile forwarded to the frontend.
#[derive(Debug, Serialize)]
pub struct FrontendUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub picture: &'a str,
}

impl<'a> From<&'a GoogleUser> for FrontendUser<'a> {
    fn from(u: &'a GoogleUser) -> Self {
        Self {
            id: &u.id,
            email: &u.email,
            name: &u.name,
            picture: &u.picture,
        }
    }
}

/// Google endpoints; overridable so tests can point at a local stub.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth: String,
    pub token: String,
    pub userinfo: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            userinfo: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

/// Authorization-code client for Google sign-in.
pub struct GoogleClient {
    http: reqwest::Client,
    oauth: GoogleOAuth,
    userinfo_url: String,
}

impl GoogleClient {
    pub fn new(config: &OAuthConfig) -> Result<Self, GoogleError> {
        Self::with_endpoints(config, Endpoints::default())
    }

    pub fn with_endpoints(config: &OAuthConfig, endpoints: Endpoints) -> Result<Self, GoogleError> {
        // Token responses must not follow redirects.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(GoogleError::Client)?;
        let oauth = BasicClient::new(ClientId::new(config.google_client_id.clone()))
            .set_client_secret(ClientSecret::new(config.google_client_secret.clone()))
            .set_auth_uri(AuthUrl::new(endpoints.auth)?)
            .set_token_uri(TokenUrl::new(endpoints.token)?)
            .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);
        Ok(Self {
            http,
            oauth,
            userinfo_url: endpoints.userinfo,
        })
    }

    /// URL the browser is sent to, carrying `state` for the callback check.
    pub fn authorization_url(&self, state: &str) -> String {
        let state = state.to_string();
        let (url, _) = self
            .oauth
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .url();
        url.to_string()
    }

    /// Trade an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, GoogleError> {
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| GoogleError::Exchange(e.to_string()))?;
        Ok(token.access_token().secret().clone())
    }

    pub async fn fetch_user(&self, access_token: &str) -> Result<GoogleUser, GoogleError> {
        let resp = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(GoogleError::UserInfo)?;
        resp.json().await.map_err(GoogleError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn client() -> GoogleClient {
        GoogleClient::new(&OAuthConfig {
            google_client_id: "client-123".to_string(),
            google_client_secret: "shh".to_string(),
            ..OAuthConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_authorization_url_carries_state() {
        let raw = client().authorization_url("abc_-123");
        let url = Url::parse(&raw).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["state"], "abc_-123");
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["access_type"], "offline");
        assert_eq!(
            pairs["redirect_uri"],
            "http://localhost:8080/auth/google/callback"
        );
        assert!(pairs["scope"].contains("userinfo.email"));
        assert!(!pairs.contains_key("client_secret"));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let endpoints = Endpoints {
            token: "not a url".to_string(),
            ..Endpoints::default()
        };
        let result = GoogleClient::with_endpoints(&OAuthConfig::default(), endpoints);
        assert!(matches!(result, Err(GoogleError::Endpoint(_))));
    }

    #[tokio::test]
    async fn test_exchange_failure_maps_to_exchange_error() {
        // Nothing listens on port 9 locally.
        let endpoints = Endpoints {
            token: "http://127.0.0.1:9/token".to_string(),
            ..Endpoints::default()
        };
        let client = GoogleClient::with_endpoints(&OAuthConfig::default(), endpoints).unwrap();
        let err = client.exchange_code("code").await.unwrap_err();
        assert!(matches!(err, GoogleError::Exchange(_)));
        assert_eq!(err.public_message(), "failed to exchange code for token");
    }

    #[test]
    fn test_frontend_user_serializes_subset() {
        let user = GoogleUser {
            id: "42".to_string(),
            email: "a@b.c".to_string(),
            verified_email: true,
            name: "A \"quoted\" name".to_string(),
            given_name: "A".to_string(),
            family_name: "B".to_string(),
            picture: "https://x/y.png".to_string(),
        };
        let json = serde_json::to_value(FrontendUser::from(&user)).unwrap();
        assert_eq!(json["name"], "A \"quoted\" name");
        assert!(json.get("given_name").is_none());
    }
}
