//! Cache synchronization: the event-to-action dispatch table.
//!
//! [`plan_for`] is a pure function from (event, viewer role) to the exact set
//! of cache commands, so the contract stays mechanically checkable. The
//! [`CacheSynchronizer`] applies a plan in a fixed order — invalidations,
//! then replacements, then evictions — which makes eviction dominate
//! invalidation for the same key within one event-processing pass.

use std::sync::Arc;

use serde_json::Value;

use quorum_cache::{QueryKey, ResultCache};
use quorum_core::Role;
use quorum_events::ServerEvent;

/// The cache commands one event resolves to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncPlan {
    /// Keys to mark stale.
    pub invalidate: Vec<QueryKey>,
    /// Keys to overwrite with a pushed payload.
    pub replace: Vec<(QueryKey, Value)>,
    /// Keys to remove outright. Applied last.
    pub evict: Vec<QueryKey>,
}

impl SyncPlan {
    /// A plan with no actions (admin-scoped event seen by a voter).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this plan performs no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invalidate.is_empty() && self.replace.is_empty() && self.evict.is_empty()
    }
}

/// Resolve one event into its cache commands.
///
/// Admin-scoped events (`dashboard_stats_updated`, `vote_activity`,
/// `user_activity`, `poll_created`) produce an empty plan for voters: those
/// cache keys only exist on admin screens.
#[must_use]
pub fn plan_for(event: &ServerEvent, role: Role) -> SyncPlan {
    match event {
        ServerEvent::PollUpdated { poll_id } | ServerEvent::PollStatusChanged { poll_id } => {
            SyncPlan {
                invalidate: vec![
                    QueryKey::Polls,
                    QueryKey::Poll(poll_id.clone()),
                    QueryKey::ActivePolls,
                ],
                ..SyncPlan::default()
            }
        }
        ServerEvent::NewVote { poll_id, .. } => SyncPlan {
            invalidate: vec![
                QueryKey::Polls,
                QueryKey::Poll(poll_id.clone()),
                QueryKey::PollVoters(poll_id.clone()),
                QueryKey::PollAnalytics(poll_id.clone()),
            ],
            ..SyncPlan::default()
        },
        ServerEvent::NewPoll { .. } => SyncPlan {
            invalidate: vec![
                QueryKey::Polls,
                QueryKey::ActivePolls,
                QueryKey::UserDashboard,
            ],
            ..SyncPlan::default()
        },
        ServerEvent::PollActivated { .. } => SyncPlan {
            invalidate: vec![QueryKey::Polls, QueryKey::ActivePolls],
            ..SyncPlan::default()
        },
        ServerEvent::PollDeleted { poll_id, .. } => SyncPlan {
            invalidate: vec![
                QueryKey::Polls,
                QueryKey::ActivePolls,
                QueryKey::UserDashboard,
                QueryKey::AdminDashboard,
            ],
            replace: Vec::new(),
            evict: QueryKey::poll_scoped(poll_id).into(),
        },
        ServerEvent::DashboardStatsUpdated(stats) => {
            if role.is_admin() {
                SyncPlan {
                    invalidate: vec![QueryKey::AdminDashboard],
                    replace: vec![(QueryKey::AdminRealtimeStats, stats.clone())],
                    evict: Vec::new(),
                }
            } else {
                SyncPlan::empty()
            }
        }
        ServerEvent::VoteActivity { poll_id } => {
            if role.is_admin() {
                SyncPlan {
                    invalidate: vec![
                        QueryKey::AdminDashboard,
                        QueryKey::PollVoters(poll_id.clone()),
                    ],
                    ..SyncPlan::default()
                }
            } else {
                SyncPlan::empty()
            }
        }
        ServerEvent::UserActivity => {
            if role.is_admin() {
                SyncPlan {
                    invalidate: vec![QueryKey::AdminDashboard],
                    ..SyncPlan::default()
                }
            } else {
                SyncPlan::empty()
            }
        }
        ServerEvent::PollCreated => {
            if role.is_admin() {
                SyncPlan {
                    invalidate: vec![QueryKey::AdminDashboard, QueryKey::Polls],
                    ..SyncPlan::default()
                }
            } else {
                SyncPlan::empty()
            }
        }
    }
}

/// Applies event plans to the shared result cache.
pub struct CacheSynchronizer {
    cache: Arc<dyn ResultCache>,
    role: Role,
}

impl CacheSynchronizer {
    /// Create a synchronizer writing through to `cache` on behalf of `role`.
    pub fn new(cache: Arc<dyn ResultCache>, role: Role) -> Self {
        Self { cache, role }
    }

    /// Resolve and apply the cache commands for one event.
    ///
    /// Ordering within the pass: invalidate, replace, evict. All commands
    /// are idempotent, so re-applying the same event is harmless.
    pub fn apply(&self, event: &ServerEvent) {
        let plan = plan_for(event, self.role);
        if plan.is_empty() {
            return;
        }
        tracing::debug!(
            kind = event.kind(),
            invalidations = plan.invalidate.len(),
            replacements = plan.replace.len(),
            evictions = plan.evict.len(),
            "applying cache plan"
        );
        for key in &plan.invalidate {
            self.cache.invalidate(key);
        }
        for (key, value) in plan.replace {
            self.cache.replace(key, value);
        }
        for key in &plan.evict {
            self.cache.evict(key);
        }
    }
}
