//! The sync bridge: identity-driven lifecycle around the push channel.
//!
//! The host owns one [`SyncBridge`] for the lifetime of the process. Login
//! hands it an identity via [`SyncBridge::start`]; logout withdraws it via
//! [`SyncBridge::stop`] (or `start(None)`). At most one connection exists at
//! any moment: starting with a new identity tears the old connection down
//! first, under the same lock, so two rapid identity changes cannot race
//! into two live sockets.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

use quorum_cache::ResultCache;
use quorum_core::{ChannelError, Identity, PollId, Role};
use quorum_events::ServerEvent;

use crate::channel::PushChannel;
use crate::config::BridgeConfig;
use crate::notify::{NotificationSink, notification_for};
use crate::sync::CacheSynchronizer;

/// Orchestrates the push channel, the cache synchronizer, and the
/// notification emitter for one application session.
pub struct SyncBridge {
    config: BridgeConfig,
    cache: Arc<dyn ResultCache>,
    sink: Arc<dyn NotificationSink>,
    connected: Arc<watch::Sender<bool>>,
    active: Mutex<Option<Active>>,
}

struct Active {
    channel: PushChannel,
    dispatcher: JoinHandle<()>,
}

impl Active {
    /// Close the channel and wait for the dispatcher to finish.
    ///
    /// Awaiting the join handle matters: the dispatcher writes the shared
    /// connected flag on exit, and a replacement connection must not observe
    /// that write after its own.
    async fn teardown(self) {
        self.channel.disconnect();
        self.dispatcher.abort();
        let _ = self.dispatcher.await;
    }
}

impl SyncBridge {
    /// Create a stopped bridge.
    pub fn new(
        config: BridgeConfig,
        cache: Arc<dyn ResultCache>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            config,
            cache,
            sink,
            connected: Arc::new(connected),
            active: Mutex::new(None),
        }
    }

    /// Apply an identity change.
    ///
    /// Any existing connection is torn down first. With `Some(identity)` a
    /// new connection is opened, authenticated with the identity's token and
    /// already subscribed to dashboard events; with `None` the bridge stays
    /// stopped. A connect failure leaves the bridge stopped and is returned
    /// to the caller, who decides whether to retry.
    pub async fn start(&self, identity: Option<Identity>) -> Result<(), ChannelError> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            previous.teardown().await;
        }
        let _ = self.connected.send_replace(false);

        let Some(identity) = identity else {
            tracing::debug!("no identity, bridge stays stopped");
            return Ok(());
        };

        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer);
        let channel = PushChannel::connect(&self.config, &identity, event_tx).await?;
        let _ = self.connected.send_replace(true);

        let dispatcher = tokio::spawn(dispatch_loop(
            event_rx,
            CacheSynchronizer::new(Arc::clone(&self.cache), identity.role),
            Arc::clone(&self.sink),
            identity.role,
            Arc::clone(&self.connected),
        ));
        *active = Some(Active {
            channel,
            dispatcher,
        });
        Ok(())
    }

    /// Tear down the connection, if any. Idempotent.
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            previous.teardown().await;
        }
        let _ = self.connected.send_replace(false);
    }

    /// Current connection status.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Observable connection status, valid across restarts.
    #[must_use]
    pub fn connected_watch(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    /// Follow a poll topic. A no-op while stopped.
    pub async fn subscribe_poll(&self, poll_id: &PollId) {
        match self.active.lock().await.as_ref() {
            Some(active) => active.channel.subscribe_poll(poll_id),
            None => tracing::debug!(poll_id = %poll_id, "bridge stopped, subscribe skipped"),
        }
    }

    /// Stop following a poll topic. A no-op while stopped or not subscribed.
    pub async fn unsubscribe_poll(&self, poll_id: &PollId) {
        if let Some(active) = self.active.lock().await.as_ref() {
            active.channel.unsubscribe_poll(poll_id);
        }
    }
}

/// Process events serially, in arrival order: cache commands first, then the
/// optional notification. Exits when the channel loop is gone and flips the
/// connected flag on the way out.
async fn dispatch_loop(
    mut event_rx: mpsc::Receiver<ServerEvent>,
    synchronizer: CacheSynchronizer,
    sink: Arc<dyn NotificationSink>,
    role: Role,
    connected: Arc<watch::Sender<bool>>,
) {
    while let Some(event) = event_rx.recv().await {
        synchronizer.apply(&event);
        if let Some(notification) = notification_for(&event, role) {
            sink.push(notification);
        }
    }
    let _ = connected.send_replace(false);
    tracing::debug!("event dispatch loop exited");
}
