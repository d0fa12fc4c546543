//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::auth::api::AuthState;
use crate::auth::models::Claims;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Auth middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Tokens cannot be issued or checked without the signing secret
    let jwt_handler = state.jwt.as_ref().ok_or(AuthError::ServerConfig)?;

    // First, check for token in query parameters (for WebSockets)
    // Example: /ws?token=...
    let token_from_query = if let Some(query) = req.uri().query() {
        query
            .split('&')
            .find(|pair| pair.starts_with("token="))
            .and_then(|pair| pair.split('=').nth(1))
            .map(|t| t.to_string())
    } else {
        None
    };

    // Second, check for Authorization header (Bearer ...)
    let token_from_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    // Use whichever token was found
    let token = token_from_query
        .or(token_from_header)
        .ok_or(AuthError::MissingToken)?;

    // Validate token and extract claims
    let claims = jwt_handler
        .validate_token(&token)
        .map_err(|_| AuthError::InvalidToken)?;

    // Add claims to request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    // Continue to next handler
    Ok(next.run(req).await)
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ServerConfig,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::ServerConfig => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error",
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use axum::{body::Body, http::Request as HttpRequest};

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let invalid_token = AuthError::InvalidToken.into_response();
        assert_eq!(invalid_token.status(), StatusCode::UNAUTHORIZED);

        let no_secret = AuthError::ServerConfig.into_response();
        assert_eq!(no_secret.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_extract_claims_from_request() {
        let mut req = HttpRequest::new(Body::empty());

        // No claims initially
        assert!(extract_claims(&req).is_none());

        // Add claims
        let claims = Claims {
            username: "cse_coord".to_string(),
            role: Role::Coordinator,
            branch: Some("CSE".to_string()),
            exp: 1234567890,
        };
        req.extensions_mut().insert(claims.clone());

        // Should be able to extract
        let extracted = extract_claims(&req);
        assert!(extracted.is_some());
        assert_eq!(extracted.unwrap().username, "cse_coord");
    }
}
