//! JWT Token Handler
//! Mission: Generate and validate JWT tokens securely

use crate::auth::models::{Account, Claims};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_hours: 24, // 24-hour tokens, no refresh
        }
    }

    /// Generate a JWT token for an account
    pub fn generate_token(&self, account: &Account) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.expiration_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            username: account.username.clone(),
            role: account.role.clone(),
            branch: account.branch.clone(),
            exp: expiration,
        };

        debug!(
            "Generating JWT for user {} ({}), expires in {}h",
            account.username,
            account.role.as_str(),
            self.expiration_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok(token)
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated JWT for user {}", decoded.claims.username);

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn create_test_account() -> Account {
        Account {
            username: "cse_coord".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Coordinator,
            branch: Some("CSE".to_string()),
        }
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let account = create_test_account();

        // Generate token
        let token = handler.generate_token(&account).unwrap();
        assert!(!token.is_empty());

        // Validate token
        let claims = handler.validate_token(&token).unwrap();
        assert_eq!(claims.username, account.username);
        assert_eq!(claims.role, account.role);
        assert_eq!(claims.branch.as_deref(), Some("CSE"));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());

        // Try to validate invalid token
        let result = handler.validate_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1".to_string());
        let handler2 = JwtHandler::new("secret2".to_string());
        let account = create_test_account();

        // Generate with handler1
        let token = handler1.generate_token(&account).unwrap();

        // Try to validate with handler2 (different secret)
        let result = handler2.validate_token(&token);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_contains_all_claims() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let account = Account {
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Admin,
            branch: None,
        };

        let token = handler.generate_token(&account).unwrap();
        let claims = handler.validate_token(&token).unwrap();

        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.branch.is_none());
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }
}
