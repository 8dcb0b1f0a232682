//! Role-gated transient notifications.
//!
//! A small, fixed set of events surfaces to the user as a toast-style
//! message. [`notification_for`] is the complete rulebook; everything it
//! returns `None` for stays silent. Delivery through [`NotificationQueue`]
//! is best-effort: a full queue drops the message and counts the drop, it
//! never blocks event processing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use quorum_core::Role;
use quorum_events::ServerEvent;

/// Visual flavor of a transient message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Something good happened (new vote, new poll).
    Success,
    /// Neutral state change (poll deleted).
    Info,
}

/// One transient user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Display text.
    pub text: String,
    /// Visual flavor.
    pub kind: NotificationKind,
    /// How long the message stays on screen.
    pub duration: Duration,
}

impl Notification {
    fn success(text: String, duration: Duration) -> Self {
        Self {
            text,
            kind: NotificationKind::Success,
            duration,
        }
    }

    fn info(text: String, duration: Duration) -> Self {
        Self {
            text,
            kind: NotificationKind::Info,
            duration,
        }
    }
}

const SHORT: Duration = Duration::from_secs(3);
const LONG: Duration = Duration::from_secs(4);

/// The message (if any) one event produces for a viewer with `role`.
///
/// Rules:
/// - `new_vote`: admins only; short success toast naming the poll.
/// - `new_poll`: voters only (admins already watch the live dashboard).
/// - `poll_activated`: voters only.
/// - `poll_deleted`: everyone; informational.
/// - everything else: silent.
#[must_use]
pub fn notification_for(event: &ServerEvent, role: Role) -> Option<Notification> {
    match event {
        ServerEvent::NewVote { poll_title, .. } if role.is_admin() => {
            let title = poll_title.as_deref().unwrap_or("poll");
            Some(Notification::success(
                format!("New vote on \"{title}\""),
                SHORT,
            ))
        }
        ServerEvent::NewPoll { title } if !role.is_admin() => Some(Notification::success(
            format!("New poll available: \"{title}\""),
            LONG,
        )),
        ServerEvent::PollActivated { title, .. } if !role.is_admin() => Some(
            Notification::success(format!("Poll \"{title}\" is now active!"), LONG),
        ),
        ServerEvent::PollDeleted { title, .. } => Some(Notification::info(
            format!("Poll \"{title}\" has been deleted"),
            LONG,
        )),
        _ => None,
    }
}

/// Where emitted notifications go. Push must never block or fail loudly.
pub trait NotificationSink: Send + Sync {
    /// Deliver one message, best-effort.
    fn push(&self, notification: Notification);
}

/// Bounded in-process notification queue.
///
/// The UI side holds the receiver; the bridge holds the sink. When the
/// receiver falls behind and the buffer fills, new messages are dropped
/// and counted rather than queued unboundedly.
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
    dropped: AtomicU64,
}

impl NotificationQueue {
    /// Create a queue with room for `capacity` undelivered messages.
    #[must_use]
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Arc::new(Self {
                tx,
                dropped: AtomicU64::new(0),
            }),
            rx,
        )
    }

    /// Messages dropped because the queue was full or closed.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl NotificationSink for NotificationQueue {
    fn push(&self, notification: Notification) {
        if let Err(err) = self.tx.try_send(notification) {
            let _ = self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(reason = %err, "notification dropped");
        }
    }
}
