//! # quorum-sync
//!
//! The real-time sync bridge between the Quorum push channel and the local
//! result cache.
//!
//! One [`SyncBridge`] lives at the application's composition root. When the
//! host hands it an identity (`start`), it opens exactly one WebSocket
//! connection authenticated with the session token, subscribes to
//! dashboard-level events, and then — serially, in arrival order — translates
//! each inbound event into cache commands and an optional role-gated
//! notification. Withdrawing the identity (`stop`, or `start(None)`) tears
//! the connection down and cancels pending subscription sends.
//!
//! Failure philosophy: the bridge is a background subsystem. Connection
//! drops, unknown events, and full notification queues all degrade to "stale
//! data until the next refetch", never to a crash.

#![deny(unsafe_code)]

pub mod bridge;
pub mod channel;
pub mod config;
pub mod notify;
pub mod sync;

pub use bridge::SyncBridge;
pub use channel::PushChannel;
pub use config::BridgeConfig;
pub use notify::{Notification, NotificationKind, NotificationQueue, NotificationSink};
pub use sync::{CacheSynchronizer, SyncPlan};
