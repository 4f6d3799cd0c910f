use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::analytics::{self, AnalyticsStore};
use crate::auth::{self, state::AuthState};
use crate::comments::{self, CommentStore};
use crate::config::{AppConfig, RateLimitConfig};
use crate::oauth::{self, GoogleClient, OAuthState, OAuthStateManager};
use crate::posts::{self, PostCatalog, PostState};

/// Request bodies are small JSON documents (logins, posts, comments).
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Every long-lived component, built once at startup and shared by handle.
pub struct AppServices {
    pub auth: Arc<AuthState>,
    pub oauth: Arc<OAuthState>,
    pub posts: Arc<PostState>,
    pub comments: Arc<CommentStore>,
}

impl AppServices {
    /// Load durable state and wire the components together.
    pub fn init(config: &AppConfig) -> Self {
        let analytics = Arc::new(AnalyticsStore::open(&config.analytics.path));
        let catalog = Arc::new(PostCatalog::load(&config.posts.path));

        let google = if config.oauth.is_configured() {
            match GoogleClient::new(&config.oauth) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::warn!(error = %e, "google client failed to initialize, running without sign-in");
                    None
                }
            }
        } else {
            tracing::warn!("google oauth not configured; blog will run in public-only mode");
            None
        };

        Self::assemble(
            AuthState::new(&config.auth),
            analytics,
            catalog,
            Arc::new(OAuthStateManager::new(config.oauth.state_ttl_secs)),
            google,
            config.oauth.frontend_url.clone(),
        )
    }

    pub fn assemble(
        auth: AuthState,
        analytics: Arc<AnalyticsStore>,
        catalog: Arc<PostCatalog>,
        states: Arc<OAuthStateManager>,
        google: Option<Arc<GoogleClient>>,
        frontend_url: String,
    ) -> Self {
        let oauth = Arc::new(OAuthState {
            states,
            google,
            jwt: auth.jwt.clone(),
            frontend_url,
        });
        Self {
            auth: Arc::new(auth),
            oauth,
            posts: Arc::new(PostState { catalog, analytics }),
            comments: Arc::new(CommentStore::new()),
        }
    }

    pub fn analytics(&self) -> &Arc<AnalyticsStore> {
        &self.posts.analytics
    }
}

/// Build the HTTP surface. `rate_limit` is applied to login and OAuth routes
/// when given; it needs the peer address from `ConnectInfo`.
pub fn build_router(
    services: &AppServices,
    cors_origin: &str,
    rate_limit: Option<&RateLimitConfig>,
) -> Router {
    let jwt = services.auth.jwt.clone();

    // ── Auth routes (public) ──
    let mut auth_routes = Router::new()
        .route("/login", post(auth::handler::login))
        .with_state(services.auth.clone())
        .merge(
            Router::new()
                .route("/auth/google/login", get(oauth::handler::google_login))
                .route(
                    "/auth/google/callback",
                    get(oauth::handler::google_callback),
                )
                .with_state(services.oauth.clone()),
        );

    if let Some(limits) = rate_limit {
        match GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(limits.auth_per_second)
            .burst_size(limits.auth_burst_size)
            .finish()
        {
            Some(conf) => auth_routes = auth_routes.layer(GovernorLayer::new(conf)),
            None => tracing::warn!("invalid auth rate limit config, rate limiting disabled"),
        }
    }

    // ── Public post routes ──
    let post_routes = Router::new()
        .route("/posts", get(posts::handler::list_posts))
        .route("/posts/{id}", get(posts::handler::get_post))
        .route("/posts/{id}/view", post(analytics::handler::track_view))
        .with_state(services.posts.clone());

    // ── Admin routes (JWT + admin role) ──
    let admin_routes = Router::new()
        .route("/posts", post(posts::handler::create_post))
        .route("/analytics", get(analytics::handler::list_analytics))
        .layer(middleware::from_fn(auth::bearer::require_admin))
        .layer(middleware::from_fn(auth::bearer::require_auth))
        .layer(axum::Extension(jwt.clone()))
        .with_state(services.posts.clone());

    // ── Comment routes ──
    let comment_routes = Router::new()
        .route("/comments", get(comments::list_comments))
        .with_state(services.comments.clone())
        .merge(
            Router::new()
                .route("/comments", post(comments::create_comment))
                .layer(middleware::from_fn(auth::bearer::require_auth))
                .layer(axum::Extension(jwt))
                .with_state(services.comments.clone()),
        );

    let health_route = Router::new().route("/health", get(health));

    let app = Router::new()
        .merge(health_route)
        .merge(auth_routes)
        .merge(post_routes)
        .merge(admin_routes)
        .merge(comment_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        ),
        Err(e) => {
            tracing::warn!(origin = %cors_origin, error = %e, "invalid cors origin, CORS disabled");
            app
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
