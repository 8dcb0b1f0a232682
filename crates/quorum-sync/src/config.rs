//! Bridge configuration.
//!
//! Plain defaults plus strict environment variable overrides:
//!
//! - Integers must parse and fall within the documented range
//! - Invalid values are silently ignored (fall back to the default)

use serde::{Deserialize, Serialize};

/// Configuration for the sync bridge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Push channel endpoint (default `"ws://127.0.0.1:5000/socket"`).
    pub endpoint: String,
    /// WebSocket handshake timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Buffer size for outbound control commands.
    pub command_buffer: usize,
    /// Buffer size for inbound events awaiting dispatch.
    pub event_buffer: usize,
    /// Capacity of the transient notification queue.
    pub notification_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:5000/socket".into(),
            connect_timeout_ms: 5_000,
            command_buffer: 32,
            event_buffer: 64,
            notification_capacity: 16,
        }
    }
}

impl BridgeConfig {
    /// Defaults with environment variable overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply environment variable overrides to this config.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = read_env_string("QUORUM_WS_URL") {
            self.endpoint = v;
        }
        if let Some(v) = read_env_u64("QUORUM_CONNECT_TIMEOUT_MS", 100, 120_000) {
            self.connect_timeout_ms = v;
        }
        if let Some(v) = read_env_usize("QUORUM_COMMAND_BUFFER", 1, 4_096) {
            self.command_buffer = v;
        }
        if let Some(v) = read_env_usize("QUORUM_EVENT_BUFFER", 1, 4_096) {
            self.event_buffer = v;
        }
        if let Some(v) = read_env_usize("QUORUM_NOTIFICATION_CAPACITY", 1, 1_024) {
            self.notification_capacity = v;
        }
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    parse_u64(std::env::var(name).ok(), min, max)
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    parse_usize(std::env::var(name).ok(), min, max)
}

fn parse_u64(value: Option<String>, min: u64, max: u64) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| (min..=max).contains(v))
}

fn parse_usize(value: Option<String>, min: usize, max: usize) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| (min..=max).contains(v))
}
