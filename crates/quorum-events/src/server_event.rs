//! Inbound push events.
//!
//! The backend sends one JSON text frame per event:
//!
//! ```json
//! {"event": "new_vote", "data": {"pollId": "p1", "pollTitle": "Lunch spot"}}
//! ```
//!
//! The `event` name is the dispatch key. Payload fields are camelCase on the
//! wire. Extra payload fields are ignored so the backend can grow payloads
//! without breaking older clients.

use quorum_core::PollId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event pushed by the server over the channel.
///
/// The enumeration is closed: an inbound frame whose `event` name has no
/// variant here is dropped by [`ServerEvent::parse`]. Admin-scoped variants
/// are only ever acted on for admin viewers, but parsing itself is
/// role-agnostic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// A poll's fields changed (title, options, settings).
    PollUpdated {
        /// The poll that changed.
        poll_id: PollId,
    },
    /// Someone cast a vote.
    NewVote {
        /// The poll voted on.
        poll_id: PollId,
        /// Poll title for the admin notification; the backend may omit it.
        poll_title: Option<String>,
    },
    /// A poll was published and is available to voters.
    NewPoll {
        /// Title of the new poll.
        title: String,
    },
    /// A poll's open/closed status flipped.
    PollStatusChanged {
        /// The poll whose status changed.
        poll_id: PollId,
    },
    /// A scheduled poll became active.
    PollActivated {
        /// The poll that opened.
        poll_id: PollId,
        /// Title for the voter notification.
        title: String,
    },
    /// A poll was removed entirely.
    PollDeleted {
        /// The deleted poll.
        poll_id: PollId,
        /// Title for the notification.
        title: String,
    },
    /// Full admin dashboard stats, pushed whole so no refetch is needed.
    DashboardStatsUpdated(Value),
    /// Admin-scoped vote activity ping.
    VoteActivity {
        /// The poll that received the vote.
        poll_id: PollId,
    },
    /// Admin-scoped user activity ping (login, registration).
    UserActivity,
    /// Admin-scoped duplicate of `new_poll` for admin-only cache keys.
    PollCreated,
}

impl ServerEvent {
    /// Parse a text frame into an event.
    ///
    /// Unknown event names and malformed JSON both yield `None`; neither is
    /// an error. The channel keeps running either way.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(text) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "dropping unrecognized push frame");
                None
            }
        }
    }

    /// Wire name of this event, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PollUpdated { .. } => "poll_updated",
            Self::NewVote { .. } => "new_vote",
            Self::NewPoll { .. } => "new_poll",
            Self::PollStatusChanged { .. } => "poll_status_changed",
            Self::PollActivated { .. } => "poll_activated",
            Self::PollDeleted { .. } => "poll_deleted",
            Self::DashboardStatsUpdated(_) => "dashboard_stats_updated",
            Self::VoteActivity { .. } => "vote_activity",
            Self::UserActivity => "user_activity",
            Self::PollCreated => "poll_created",
        }
    }

    /// The poll this event targets, when it targets one.
    #[must_use]
    pub fn poll_id(&self) -> Option<&PollId> {
        match self {
            Self::PollUpdated { poll_id }
            | Self::NewVote { poll_id, .. }
            | Self::PollStatusChanged { poll_id }
            | Self::PollActivated { poll_id, .. }
            | Self::PollDeleted { poll_id, .. }
            | Self::VoteActivity { poll_id } => Some(poll_id),
            Self::NewPoll { .. }
            | Self::DashboardStatsUpdated(_)
            | Self::UserActivity
            | Self::PollCreated => None,
        }
    }
}
