//! FeedbackHub Backend
//! Mission: Role-scoped configuration and student feedback service

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::interval;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedbackhub_backend::{
    auth::{AuthState, CredentialStore, JwtHandler},
    configs::ConfigStore,
    feedback::FeedbackStore,
    middleware::{RateLimitConfig, RateLimitLayer},
    models::Config,
    realtime::Notifier,
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🚀 FeedbackHub Backend Starting");

    let config = Config::from_env()?;

    // Credential tables are seeded in memory at startup
    let credentials = Arc::new(CredentialStore::from_env(
        &config.admin_username,
        &config.admin_password,
    )?);

    // Without the signing secret the server still boots, but every login
    // and token check answers with a server configuration error.
    let jwt_handler = match config.jwt_secret.clone() {
        Some(secret) => Some(Arc::new(JwtHandler::new(secret))),
        None => {
            warn!("⚠️  JWT_SECRET is not set - authentication will fail until it is configured");
            None
        }
    };
    let auth_state = AuthState::new(credentials, jwt_handler);

    // IMPORTANT: This defaults to the crate directory so running from the repo
    // root doesn't accidentally create a new empty DB in a different working
    // directory.
    let db_path = resolve_data_path(&config.database_path);
    let configs = Arc::new(ConfigStore::new(&db_path)?);
    let feedback = Arc::new(FeedbackStore::new(&db_path)?);
    info!("📊 Database initialized at: {}", db_path);

    let notifier = Notifier::new(1000);

    let app_state = AppState {
        configs,
        feedback,
        notifier,
    };

    // Login brute-force protection
    let limiter = RateLimitLayer::new(RateLimitConfig::default());
    tokio::spawn(rate_limit_cleanup(limiter.clone()));

    let cors = build_cors(config.cors_origin.as_deref());
    let app = create_router(auth_state, app_state, limiter).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

/// Periodically prune stale rate limiter entries.
async fn rate_limit_cleanup(limiter: RateLimitLayer) {
    let mut ticker = interval(Duration::from_secs(300));
    loop {
        ticker.tick().await;
        limiter.cleanup();
    }
}

fn build_cors(origin: Option<&str>) -> CorsLayer {
    match origin {
        Some(raw) => match raw.parse::<HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
                .allow_credentials(true),
            Err(_) => {
                warn!(
                    "⚠️  Invalid CORS_ORIGIN '{}' - falling back to permissive",
                    raw
                );
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedbackhub_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try crate-root .env (common when running with --manifest-path from elsewhere)
    // CARGO_MANIFEST_DIR points at the crate directory at compile time.
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}

fn resolve_data_path(raw: &str) -> String {
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    // Treat relative paths as relative to the crate directory, not the caller's cwd.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(p)
        .to_string_lossy()
        .to_string()
}
