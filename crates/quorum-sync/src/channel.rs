//! Push channel — thin client over `tokio-tungstenite`.
//!
//! Owns exactly one WebSocket connection per connected identity. The
//! connection handshake carries the session token as a query parameter; the
//! server closes the socket on an invalid token, which this client reflects
//! as a flipped connected flag rather than an error of its own.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use quorum_core::{ChannelError, Identity, PollId};
use quorum_events::{ClientCommand, ServerEvent};

use crate::config::BridgeConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A live push channel connection.
///
/// Created by [`PushChannel::connect`], destroyed by [`PushChannel::disconnect`]
/// (or by dropping, which also aborts the channel loop). Topic subscriptions
/// are tracked locally so duplicate subscribe/unsubscribe calls send nothing.
pub struct PushChannel {
    cmd_tx: mpsc::Sender<ClientCommand>,
    connected: Arc<watch::Sender<bool>>,
    topics: parking_lot::Mutex<HashSet<PollId>>,
    handler: JoinHandle<()>,
}

impl PushChannel {
    /// Open a connection authenticated with the identity's token.
    ///
    /// On success the dashboard subscription has already been queued ahead of
    /// any caller command. Parsed events are delivered serially on `event_tx`.
    pub async fn connect(
        config: &BridgeConfig,
        identity: &Identity,
        event_tx: mpsc::Sender<ServerEvent>,
    ) -> Result<Self, ChannelError> {
        let url = format!("{}?token={}", config.endpoint, identity.token);
        let timeout_ms = config.connect_timeout_ms;

        let (ws, _) = tokio::time::timeout(Duration::from_millis(timeout_ms), connect_async(&url))
            .await
            .map_err(|_| ChannelError::Timeout {
                timeout_ms,
                context: "WebSocket handshake".into(),
            })?
            .map_err(|e| ChannelError::ConnectFailed {
                context: e.to_string(),
            })?;

        let (connected_tx, _) = watch::channel(true);
        let connected = Arc::new(connected_tx);
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
        let handler = tokio::spawn(channel_loop(ws, cmd_rx, event_tx, Arc::clone(&connected)));

        cmd_tx
            .send(ClientCommand::SubscribeDashboard)
            .await
            .map_err(|_| ChannelError::Closed)?;

        tracing::info!(user_id = %identity.user_id, "push channel connected");
        Ok(Self {
            cmd_tx,
            connected,
            topics: parking_lot::Mutex::new(HashSet::new()),
            handler,
        })
    }

    /// Current connection status.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Observable connection status for live indicators.
    #[must_use]
    pub fn connected_watch(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    /// Follow a poll topic. Duplicate calls send nothing.
    pub fn subscribe_poll(&self, poll_id: &PollId) {
        let newly_added = self.topics.lock().insert(poll_id.clone());
        if newly_added {
            self.send_command(ClientCommand::SubscribePoll {
                poll_id: poll_id.clone(),
            });
        }
    }

    /// Stop following a poll topic. A no-op when not subscribed.
    pub fn unsubscribe_poll(&self, poll_id: &PollId) {
        let was_subscribed = self.topics.lock().remove(poll_id);
        if was_subscribed {
            self.send_command(ClientCommand::UnsubscribePoll {
                poll_id: poll_id.clone(),
            });
        }
    }

    /// Close the connection.
    ///
    /// Flips the connected flag before aborting the channel loop, so
    /// observers see `false` as soon as this returns. Aborting the loop
    /// cancels any queued subscribe/unsubscribe sends.
    pub fn disconnect(self) {
        let _ = self.connected.send_replace(false);
        self.handler.abort();
        tracing::info!("push channel disconnected");
    }

    /// Best-effort send: silently dropped when the loop is gone or busy.
    fn send_command(&self, command: ClientCommand) {
        if !self.is_connected() {
            tracing::debug!("push channel not connected, command skipped");
            return;
        }
        if self.cmd_tx.try_send(command).is_err() {
            tracing::debug!("push channel command dropped (buffer full or loop gone)");
        }
    }
}

/// Pump the socket: outbound commands in, inbound events out.
///
/// Exits when the socket closes, the command sender is dropped, or the event
/// receiver is dropped. Always flips the connected flag to false on the way
/// out.
async fn channel_loop(
    ws: WsStream,
    mut cmd_rx: mpsc::Receiver<ClientCommand>,
    event_tx: mpsc::Sender<ServerEvent>,
    connected: Arc<watch::Sender<bool>>,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                };
                let frame = match cmd.to_message() {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to serialize command");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            msg = ws_rx.next() => {
                let Some(Ok(msg)) = msg else { break };
                let Message::Text(text) = msg else { continue };
                let Some(event) = ServerEvent::parse(&text) else { continue };
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = connected.send_replace(false);
    tracing::debug!("push channel loop exited");
}
