//! HTTP Routes Module
//! Mission: Assemble the public, login, and token-protected route trees

use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{api as auth_api, auth_middleware, AuthState};
use crate::configs::{api as config_api, ConfigStore};
use crate::feedback::{api as feedback_api, FeedbackStore};
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitLayer};
use crate::realtime::{websocket_handler, Notifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub configs: Arc<ConfigStore>,
    pub feedback: Arc<FeedbackStore>,
    pub notifier: Notifier,
}

/// Create the API router
pub fn create_router(auth_state: AuthState, state: AppState, limiter: RateLimitLayer) -> Router {
    // Login is public but rate limited per client IP
    let login_routes = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .route_layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ))
        .with_state(auth_state.clone());

    // Everything behind the token check
    let protected_routes = Router::new()
        .route("/api/auth/verify", get(auth_api::verify))
        .route(
            "/api/config",
            post(config_api::create_config).get(config_api::list_configs),
        )
        .route(
            "/api/config/:title",
            get(config_api::get_config_by_title)
                .put(config_api::update_config)
                .delete(config_api::delete_config),
        )
        .route("/api/feedback", get(feedback_api::list_feedback))
        .route("/ws", get(websocket_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    // Public routes (health check + anonymous student feedback)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/feedback", post(feedback_api::submit_feedback))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(login_routes)
        .layer(middleware::from_fn(request_logging))
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
