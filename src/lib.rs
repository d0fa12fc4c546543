//! FeedbackHub Backend Library
//!
//! Exposes the service modules for use by the server binary and
//! integration tests.

pub mod auth;
pub mod configs;
pub mod feedback;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod routes;
