//! Authentication API Endpoints
//! Mission: Provide login and token verification endpoints

use crate::auth::{
    credentials::CredentialStore,
    jwt::JwtHandler,
    middleware::extract_claims,
    models::{LoginRequest, LoginResponse, Role, UserResponse, VerifyResponse},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub credentials: Arc<CredentialStore>,
    /// Absent when JWT_SECRET is unset; logins and protected routes
    /// then fail with a configuration error, not an auth error
    pub jwt: Option<Arc<JwtHandler>>,
}

impl AuthState {
    pub fn new(credentials: Arc<CredentialStore>, jwt: Option<Arc<JwtHandler>>) -> Self {
        Self { credentials, jwt }
    }
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    // Report exactly which required fields were absent or empty
    let missing = MissingFields {
        username: payload.username.as_deref().unwrap_or("").is_empty(),
        password: payload.password.as_deref().unwrap_or("").is_empty(),
        role: payload.role.as_deref().unwrap_or("").is_empty(),
    };
    if missing.username || missing.password || missing.role {
        return Err(AuthApiError::MissingFields(missing));
    }

    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    let role_str = payload.role.unwrap_or_default();

    info!("🔐 Login attempt: {} (role: {})", username, role_str);

    // Unknown usernames, wrong roles, and bad passwords all collapse
    // into the same generic failure; never hint which one it was
    let role = match Role::from_str(&role_str) {
        Some(role) => role,
        None => {
            warn!("❌ Failed login attempt: {}", username);
            return Err(AuthApiError::InvalidCredentials);
        }
    };

    let account = match state.credentials.lookup(&role, &username) {
        Some(account) => account,
        None => {
            warn!("❌ Failed login attempt: {}", username);
            return Err(AuthApiError::InvalidCredentials);
        }
    };

    let valid = state
        .credentials
        .verify_password(account, &password)
        .map_err(|_| AuthApiError::InternalError)?;

    if !valid {
        warn!("❌ Failed login attempt: {}", username);
        return Err(AuthApiError::InvalidCredentials);
    }

    // Token issuance requires the signing secret
    let jwt = state.jwt.as_ref().ok_or(AuthApiError::ServerConfig)?;

    let token = jwt
        .generate_token(account)
        .map_err(|_| AuthApiError::InternalError)?;

    info!(
        "✅ Login successful: {} ({})",
        account.username,
        account.role.as_str()
    );

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from_account(account),
    }))
}

/// Token verification endpoint - GET /api/auth/verify
///
/// Echoes the identity the auth middleware resolved; no table lookup.
pub async fn verify(req: Request) -> Result<Json<VerifyResponse>, AuthApiError> {
    let claims = extract_claims(&req).ok_or(AuthApiError::Unauthorized)?;

    Ok(Json(VerifyResponse {
        user: UserResponse::from_claims(claims),
    }))
}

/// Which required login fields were absent
#[derive(Debug, Serialize)]
pub struct MissingFields {
    pub username: bool,
    pub password: bool,
    pub role: bool,
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    MissingFields(MissingFields),
    InvalidCredentials,
    Unauthorized,
    ServerConfig,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthApiError::MissingFields(missing) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing required fields", "missing": missing }),
            ),
            AuthApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid credentials" }),
            ),
            AuthApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication required" }),
            ),
            AuthApiError::ServerConfig => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Server configuration error" }),
            ),
            AuthApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
