//! Notification Fan-out
//! Mission: Publish refresh events to branch, admin, and BSH channels

use crate::configs::models::is_bsh_branch;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Refresh event kinds delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshKind {
    #[serde(rename = "config-refresh")]
    Config,
    #[serde(rename = "feedback-refresh")]
    Feedback,
}

/// A refresh notification bound for one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshEvent {
    #[serde(rename = "type")]
    pub kind: RefreshKind,
    pub channel: String,
}

/// Channels notified for a branch: the branch room, the admin room,
/// and the bsh room for BSH-designated branches
pub fn channels_for(branch: &str) -> Vec<String> {
    let mut channels = vec![format!("branch-{}", branch), "admin".to_string()];
    if is_bsh_branch(branch) {
        channels.push("bsh".to_string());
    }
    channels
}

/// Broadcast-backed notification fan-out
///
/// Publication is fire-and-forget: it happens after the triggering
/// mutation commits and never fails the caller. Slow subscribers skip
/// missed events; nothing is persisted or retried.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<RefreshEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.tx.subscribe()
    }

    pub fn config_changed(&self, branch: &str) {
        self.publish(RefreshKind::Config, branch);
    }

    pub fn feedback_submitted(&self, branch: &str) {
        self.publish(RefreshKind::Feedback, branch);
    }

    fn publish(&self, kind: RefreshKind, branch: &str) {
        for channel in channels_for(branch) {
            let event = RefreshEvent { kind, channel };
            // A send with zero subscribers is not a failure
            if let Err(e) = self.tx.send(event) {
                debug!("No refresh subscribers: {}", e);
            }
        }
    }
}
