//! Typed cache addressing.
//!
//! Every fetched result in the application is stored under one of these keys.
//! The bridge and the screens agree on this enumeration at compile time, so a
//! renamed key is a type error instead of a silently dead invalidation.

use std::fmt;

use quorum_core::PollId;

/// Logical address of one cached query result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full poll listing.
    Polls,
    /// The currently-active poll listing.
    ActivePolls,
    /// One poll's detail.
    Poll(PollId),
    /// One poll's tallied results.
    PollResults(PollId),
    /// One poll's voter roll (admin view).
    PollVoters(PollId),
    /// One poll's analytics (admin view).
    PollAnalytics(PollId),
    /// The voter dashboard summary.
    UserDashboard,
    /// The admin dashboard summary.
    AdminDashboard,
    /// The live admin stats pushed whole over the channel.
    AdminRealtimeStats,
}

impl QueryKey {
    /// All poll-scoped keys for one poll, in eviction order.
    ///
    /// These are exactly the entries that must be absent after the poll is
    /// deleted.
    #[must_use]
    pub fn poll_scoped(poll_id: &PollId) -> [Self; 4] {
        [
            Self::Poll(poll_id.clone()),
            Self::PollResults(poll_id.clone()),
            Self::PollVoters(poll_id.clone()),
            Self::PollAnalytics(poll_id.clone()),
        ]
    }

    /// The poll this key is scoped to, if any.
    #[must_use]
    pub fn poll_id(&self) -> Option<&PollId> {
        match self {
            Self::Poll(id)
            | Self::PollResults(id)
            | Self::PollVoters(id)
            | Self::PollAnalytics(id) => Some(id),
            Self::Polls
            | Self::ActivePolls
            | Self::UserDashboard
            | Self::AdminDashboard
            | Self::AdminRealtimeStats => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polls => f.write_str("polls"),
            Self::ActivePolls => f.write_str("active-polls"),
            Self::Poll(id) => write!(f, "poll:{id}"),
            Self::PollResults(id) => write!(f, "poll-results:{id}"),
            Self::PollVoters(id) => write!(f, "poll-voters:{id}"),
            Self::PollAnalytics(id) => write!(f, "poll-analytics:{id}"),
            Self::UserDashboard => f.write_str("user-dashboard"),
            Self::AdminDashboard => f.write_str("admin-dashboard"),
            Self::AdminRealtimeStats => f.write_str("admin-realtime-stats"),
        }
    }
}
