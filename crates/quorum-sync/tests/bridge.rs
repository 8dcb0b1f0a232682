//! End-to-end bridge tests against a local WebSocket server.
//!
//! Each test boots a real `tokio-tungstenite` acceptor, starts a bridge
//! against it, pushes wire frames, and asserts on the observable outcomes:
//! cache entries, notifications, and the connected flag.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

use quorum_cache::{Freshness, MemoryCache, QueryKey, ResultCache};
use quorum_core::{Identity, PollId, Role};
use quorum_sync::{BridgeConfig, Notification, NotificationKind, NotificationQueue, SyncBridge};

/// One accepted connection: its request URI, the frames the client sent,
/// and a handle to push frames back.
struct TestConn {
    uri: String,
    frames: mpsc::UnboundedReceiver<String>,
    push: mpsc::UnboundedSender<String>,
}

/// Accepts connections until dropped, one `TestConn` per accept.
async fn boot_server() -> (String, mpsc::UnboundedReceiver<TestConn>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (conn_tx, conn_rx) = mpsc::unbounded_channel();

    drop(tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let conn_tx = conn_tx.clone();
            drop(tokio::spawn(async move {
                let mut uri = String::new();
                let ws = accept_hdr_async(stream, |req: &Request, resp: Response| {
                    uri = req.uri().to_string();
                    Ok(resp)
                })
                .await
                .unwrap();
                let (mut ws_tx, mut ws_rx) = ws.split();
                let (frame_tx, frame_rx) = mpsc::unbounded_channel();
                let (push_tx, mut push_rx) = mpsc::unbounded_channel::<String>();
                let _ = conn_tx.send(TestConn {
                    uri,
                    frames: frame_rx,
                    push: push_tx,
                });
                loop {
                    tokio::select! {
                        msg = ws_rx.next() => {
                            let Some(Ok(msg)) = msg else { break };
                            if let Message::Text(text) = msg {
                                let _ = frame_tx.send(text.to_string());
                            }
                        }
                        frame = push_rx.recv() => {
                            let Some(frame) = frame else { break };
                            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }));
        }
    }));

    (format!("ws://{addr}/"), conn_rx)
}

fn bridge_for(
    endpoint: String,
    cache: &Arc<MemoryCache>,
) -> (SyncBridge, mpsc::Receiver<Notification>) {
    let config = BridgeConfig {
        endpoint,
        ..BridgeConfig::default()
    };
    let (queue, notifications) = NotificationQueue::new(16);
    let bridge = SyncBridge::new(config, Arc::clone(cache) as Arc<dyn ResultCache>, queue);
    (bridge, notifications)
}

fn identity(role: Role) -> Identity {
    Identity::new("tok-123", "u1", role)
}

async fn wait_for_freshness(cache: &MemoryCache, key: &QueryKey, expected: Freshness) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(entry) = cache.get(key) {
            if entry.freshness == expected {
                return;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "{key} never reached {expected:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn wait_for_absent(cache: &MemoryCache, key: &QueryKey) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while cache.contains(key) {
        assert!(
            tokio::time::Instant::now() < deadline,
            "{key} was never evicted"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn handshake_carries_token_and_subscribes_dashboard_first() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    let (bridge, _notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    assert!(bridge.is_connected());

    let mut conn = conns.recv().await.unwrap();
    assert!(
        conn.uri.ends_with("?token=tok-123"),
        "token missing from handshake URI: {}",
        conn.uri
    );
    let first = conn.frames.recv().await.unwrap();
    assert_eq!(first, r#"{"action":"subscribe_dashboard"}"#);
}

#[tokio::test]
async fn pushed_event_invalidates_cache_entries() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    cache.insert(QueryKey::Polls, serde_json::json!([]));
    cache.insert(QueryKey::Poll(PollId::from("p1")), serde_json::json!({}));
    cache.insert(QueryKey::UserDashboard, serde_json::json!({}));
    let (bridge, _notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    let mut conn = conns.recv().await.unwrap();
    let _ = conn.frames.recv().await.unwrap();

    conn.push
        .send(r#"{"event":"poll_updated","data":{"pollId":"p1"}}"#.into())
        .unwrap();

    wait_for_freshness(&cache, &QueryKey::Polls, Freshness::Stale).await;
    wait_for_freshness(&cache, &QueryKey::Poll(PollId::from("p1")), Freshness::Stale).await;
    // Keys outside the event's plan stay fresh.
    assert_eq!(
        cache.get(&QueryKey::UserDashboard).unwrap().freshness,
        Freshness::Fresh
    );
}

#[tokio::test]
async fn poll_deleted_evicts_scoped_keys_and_notifies_once() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    for key in QueryKey::poll_scoped(&PollId::from("42")) {
        cache.insert(key, serde_json::json!({}));
    }
    cache.insert(QueryKey::UserDashboard, serde_json::json!({}));
    let (bridge, mut notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    let mut conn = conns.recv().await.unwrap();
    let _ = conn.frames.recv().await.unwrap();

    conn.push
        .send(r#"{"event":"poll_deleted","data":{"pollId":"42","title":"Old Poll"}}"#.into())
        .unwrap();

    for key in QueryKey::poll_scoped(&PollId::from("42")) {
        wait_for_absent(&cache, &key).await;
    }
    wait_for_freshness(&cache, &QueryKey::UserDashboard, Freshness::Stale).await;

    let n = notifications.recv().await.unwrap();
    assert_eq!(n.text, "Poll \"Old Poll\" has been deleted");
    assert_eq!(n.kind, NotificationKind::Info);
    assert!(notifications.try_recv().is_err(), "exactly one notification");
}

#[tokio::test]
async fn dashboard_stats_replace_payload_for_admin() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    cache.insert(QueryKey::AdminDashboard, serde_json::json!({}));
    let (bridge, _notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Admin))).await.unwrap();
    let mut conn = conns.recv().await.unwrap();
    let _ = conn.frames.recv().await.unwrap();

    conn.push
        .send(r#"{"event":"dashboard_stats_updated","data":{"totalVotes":17}}"#.into())
        .unwrap();

    wait_for_freshness(&cache, &QueryKey::AdminRealtimeStats, Freshness::Fresh).await;
    assert_eq!(
        cache.get(&QueryKey::AdminRealtimeStats).unwrap().value,
        serde_json::json!({"totalVotes": 17})
    );
    wait_for_freshness(&cache, &QueryKey::AdminDashboard, Freshness::Stale).await;
}

#[tokio::test]
async fn new_poll_is_silent_for_admin_but_still_invalidates() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    cache.insert(QueryKey::Polls, serde_json::json!([]));
    let (bridge, mut notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Admin))).await.unwrap();
    let mut conn = conns.recv().await.unwrap();
    let _ = conn.frames.recv().await.unwrap();

    conn.push
        .send(r#"{"event":"new_poll","data":{"title":"Best Editor"}}"#.into())
        .unwrap();

    wait_for_freshness(&cache, &QueryKey::Polls, Freshness::Stale).await;
    assert!(notifications.try_recv().is_err());
}

#[tokio::test]
async fn notifications_arrive_in_event_order() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    let (bridge, mut notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    let mut conn = conns.recv().await.unwrap();
    let _ = conn.frames.recv().await.unwrap();

    conn.push
        .send(r#"{"event":"new_poll","data":{"title":"A"}}"#.into())
        .unwrap();
    conn.push
        .send(r#"{"event":"poll_activated","data":{"pollId":"p1","title":"B"}}"#.into())
        .unwrap();
    conn.push
        .send(r#"{"event":"poll_deleted","data":{"pollId":"p2","title":"C"}}"#.into())
        .unwrap();

    assert_eq!(
        notifications.recv().await.unwrap().text,
        "New poll available: \"A\""
    );
    assert_eq!(
        notifications.recv().await.unwrap().text,
        "Poll \"B\" is now active!"
    );
    assert_eq!(
        notifications.recv().await.unwrap().text,
        "Poll \"C\" has been deleted"
    );
}

#[tokio::test]
async fn stop_disconnects_and_silences_subscriptions() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    let (bridge, _notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    let mut conn = conns.recv().await.unwrap();
    let _ = conn.frames.recv().await.unwrap();

    bridge.stop().await;
    assert!(!bridge.is_connected());

    bridge.subscribe_poll(&PollId::from("p1")).await;
    let extra = tokio::time::timeout(Duration::from_millis(200), conn.frames.recv()).await;
    assert!(
        !matches!(extra, Ok(Some(_))),
        "stopped bridge must send nothing"
    );
}

#[tokio::test]
async fn restart_replaces_the_connection() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    let (bridge, _notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    let mut first = conns.recv().await.unwrap();
    assert_eq!(
        first.frames.recv().await.unwrap(),
        r#"{"action":"subscribe_dashboard"}"#
    );

    bridge
        .start(Some(Identity::new("tok-456", "u2", Role::Admin)))
        .await
        .unwrap();
    assert!(bridge.is_connected());

    let mut second = conns.recv().await.unwrap();
    assert!(second.uri.ends_with("?token=tok-456"));
    assert_eq!(
        second.frames.recv().await.unwrap(),
        r#"{"action":"subscribe_dashboard"}"#
    );

    // Subscriptions after the restart go out on the new connection only.
    bridge.subscribe_poll(&PollId::from("p9")).await;
    assert_eq!(
        second.frames.recv().await.unwrap(),
        r#"{"action":"subscribe_poll","pollId":"p9"}"#
    );
    let stale = tokio::time::timeout(Duration::from_millis(200), first.frames.recv()).await;
    assert!(!matches!(stale, Ok(Some(_))));
}

#[tokio::test]
async fn start_none_after_start_tears_down() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    let (bridge, _notifications) = bridge_for(endpoint, &cache);

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    let _conn = conns.recv().await.unwrap();
    assert!(bridge.is_connected());

    bridge.start(None).await.unwrap();
    assert!(!bridge.is_connected());
}

#[tokio::test]
async fn connected_watch_observes_the_lifecycle() {
    let (endpoint, mut conns) = boot_server().await;
    let cache = Arc::new(MemoryCache::new());
    let (bridge, _notifications) = bridge_for(endpoint, &cache);
    let mut watch = bridge.connected_watch();
    assert!(!*watch.borrow());

    bridge.start(Some(identity(Role::Voter))).await.unwrap();
    let _conn = conns.recv().await.unwrap();
    watch
        .wait_for(|connected| *connected)
        .await
        .expect("watch should see connect");

    bridge.stop().await;
    watch
        .wait_for(|connected| !*connected)
        .await
        .expect("watch should see disconnect");
}
