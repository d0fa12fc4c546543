//! Realtime Module
//! Mission: Broadcast refresh notifications to connected clients

pub mod hub;
pub mod ws;

pub use hub::{channels_for, Notifier, RefreshEvent, RefreshKind};
pub use ws::websocket_handler;
