use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub posts: PostsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_users")]
    pub users: Vec<UserEntry>,
}

/// A locally configured account for `POST /login`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
    pub role: String,
}

fn default_token_ttl() -> u64 {
    7200 // 2 hours
}

pub fn default_users() -> Vec<UserEntry> {
    vec![
        UserEntry {
            username: "admin".to_string(),
            password: "adminpass".to_string(),
            role: "admin".to_string(),
        },
        UserEntry {
            username: "user".to_string(),
            password: "userpass".to_string(),
            role: "user".to_string(),
        },
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfig {
    #[serde(default)]
    pub google_client_id: String,
    #[serde(default)]
    pub google_client_secret: String,
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_state_ttl")]
    pub state_ttl_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            google_client_secret: String::new(),
            redirect_url: default_redirect_url(),
            frontend_url: default_frontend_url(),
            state_ttl_secs: default_state_ttl(),
        }
    }
}

impl OAuthConfig {
    /// Google sign-in is only offered when both client credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.google_client_id.is_empty() && !self.google_client_secret.is_empty()
    }
}

fn default_redirect_url() -> String {
    "http://localhost:8080/auth/google/callback".to_string()
}
fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}
fn default_state_ttl() -> u64 {
    300 // 5 minutes
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_path")]
    pub path: PathBuf,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            path: default_analytics_path(),
        }
    }
}

fn default_analytics_path() -> PathBuf {
    PathBuf::from("data/analytics.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostsConfig {
    #[serde(default = "default_posts_path")]
    pub path: PathBuf,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            path: default_posts_path(),
        }
    }
}

fn default_posts_path() -> PathBuf {
    PathBuf::from("data/posts.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_auth_per_second")]
    pub auth_per_second: u64,
    #[serde(default = "default_auth_burst_size")]
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_second: default_auth_per_second(),
            auth_burst_size: default_auth_burst_size(),
        }
    }
}

fn default_auth_per_second() -> u64 {
    5
}
fn default_auth_burst_size() -> u32 {
    10
}

impl AppConfig {
    /// Validate configuration for security requirements.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth.jwt_secret.is_empty() || self.auth.jwt_secret == "change-me-in-production" {
            return Err("auth.jwt_secret must be set to a strong, unique value. \
                 Set it in config.toml or via QUILL__AUTH__JWT_SECRET env var."
                .to_string());
        }
        if self.auth.jwt_secret.len() < 32 {
            return Err("auth.jwt_secret must be at least 32 characters. \
                 Set a longer secret in config.toml or via QUILL__AUTH__JWT_SECRET env var."
                .to_string());
        }
        if self.auth.token_ttl_secs == 0 {
            return Err("auth.token_ttl_secs must be greater than zero".to_string());
        }
        if self.oauth.state_ttl_secs == 0 {
            return Err("oauth.state_ttl_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        // Load from config file
        let path = config_path.unwrap_or("config.toml");
        builder = builder.add_source(File::with_name(path).required(false));

        // Overlay with environment variables (QUILL__SERVER__PORT=3001, etc.)
        builder = builder.add_source(
            Environment::with_prefix("QUILL")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(secret: &str) -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            auth: AuthConfig {
                jwt_secret: secret.to_string(),
                token_ttl_secs: default_token_ttl(),
                users: default_users(),
            },
            oauth: OAuthConfig::default(),
            analytics: AnalyticsConfig::default(),
            posts: PostsConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }

    #[test]
    fn test_validate_rejects_placeholder_secret() {
        assert!(config_with_secret("change-me-in-production")
            .validate()
            .is_err());
        assert!(config_with_secret("").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        assert!(config_with_secret("too-short").validate().is_err());
    }

    #[test]
    fn test_validate_accepts_long_secret() {
        let config = config_with_secret("0123456789abcdef0123456789abcdef");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oauth_unconfigured_by_default() {
        assert!(!OAuthConfig::default().is_configured());
        let configured = OAuthConfig {
            google_client_id: "id".to_string(),
            google_client_secret: "secret".to_string(),
            ..OAuthConfig::default()
        };
        assert!(configured.is_configured());
    }

    #[test]
    fn test_default_analytics_path_and_state_ttl() {
        assert_eq!(
            AnalyticsConfig::default().path,
            PathBuf::from("data/analytics.json")
        );
        assert_eq!(OAuthConfig::default().state_ttl_secs, 300);
    }
}
