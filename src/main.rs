use clap::Parser;
use quill::app::{build_router, AppServices};
use quill::config::AppConfig;
use quill::oauth::state::state_sweep_loop;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Interval of the background sweep for abandoned sign-in attempts.
const STATE_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Parser)]
#[command(name = "quill", about = "Blog backend with page-view analytics")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(Some(&cli.config))?;

    if let Err(msg) = config.validate() {
        eprintln!("Configuration error: {msg}");
        return Err(msg.into());
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        analytics = %config.analytics.path.display(),
        posts = %config.posts.path.display(),
        "starting quill"
    );

    let services = AppServices::init(&config);

    // Spawn oauth state sweep
    let sweep_states = Arc::clone(&services.oauth.states);
    let sweep_handle = tokio::spawn(async move {
        state_sweep_loop(sweep_states, STATE_SWEEP_INTERVAL_SECS).await;
    });

    let app = build_router(
        &services,
        &config.server.cors_origin,
        Some(&config.rate_limit),
    );

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweep_handle.abort();

    // Final snapshot so the file reflects the last in-memory state.
    let analytics = Arc::clone(services.analytics());
    match tokio::task::spawn_blocking(move || analytics.flush()).await {
        Ok(Ok(())) => tracing::info!("analytics flushed"),
        Ok(Err(e)) => tracing::error!(error = %e, "failed to flush analytics on shutdown"),
        Err(e) => tracing::error!(error = %e, "analytics flush task failed"),
    }

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }

    tracing::info!("shutting down...");
}
