//! Outbound subscription control messages.

use quorum_core::PollId;
use serde::{Deserialize, Serialize};

/// A control message the client sends over the channel.
///
/// `subscribe_dashboard` is sent exactly once, immediately after a successful
/// connect. Poll subscriptions follow detail-view lifecycles and must be
/// idempotent-safe on the server (double unsubscribe is a no-op).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
#[serde(rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Subscribe to dashboard-level events.
    SubscribeDashboard,
    /// Subscribe to events scoped to one poll.
    SubscribePoll {
        /// The topic (poll) to follow.
        poll_id: PollId,
    },
    /// Stop following a poll topic.
    UnsubscribePoll {
        /// The topic (poll) to drop.
        poll_id: PollId,
    },
}

impl ClientCommand {
    /// Serialize to the wire text frame.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
