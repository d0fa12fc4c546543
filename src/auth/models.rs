//! Authentication Models
//! Mission: Define account, token claim, and login wire structures

use serde::{Deserialize, Serialize};

/// A credentialed account from the static tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub branch: Option<String>, // coordinators only
}

/// User roles for access scoping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin, // Full access, sole delete authority
    #[serde(rename = "coordinator")]
    Coordinator, // Scoped to own branch
    #[serde(rename = "bsh")]
    Bsh, // Scoped to "-BSH" tagged branches
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Coordinator => "coordinator",
            Role::Bsh => "bsh",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "coordinator" => Some(Role::Coordinator),
            "bsh" => Some(Role::Bsh),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    pub branch: Option<String>,
    pub exp: usize, // expiration timestamp
}

/// Login request body
///
/// All fields optional so the handler can report exactly which ones
/// were missing rather than bouncing the request as malformed JSON.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Token verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user: UserResponse,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub role: Role,
    pub branch: Option<String>,
}

impl UserResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            role: account.role.clone(),
            branch: account.branch.clone(),
        }
    }

    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            username: claims.username.clone(),
            role: claims.role.clone(),
            branch: claims.branch.clone(),
        }
    }
}
