//! Configuration Module
//! Mission: Role-scoped CRUD over academic configuration records

pub mod api;
pub mod models;
pub mod store;

pub use models::ConfigRecord;
pub use store::ConfigStore;
