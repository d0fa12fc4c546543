//! Authentication Module
//! Mission: Secure API access with JWT tokens and role scoping

pub mod api;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use api::AuthState;
pub use credentials::CredentialStore;
pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
