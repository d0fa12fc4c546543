//! Feedback Module
//! Mission: Collect and serve student feedback submissions

pub mod api;
pub mod models;
pub mod store;

pub use models::FeedbackRecord;
pub use store::FeedbackStore;
