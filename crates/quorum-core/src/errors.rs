//! Push channel error types.
//!
//! The bridge is a background subsystem with no user-facing error surface of
//! its own. Every failure here degrades to "disconnected until the host
//! reconnects" — none of these abort the host application.

use thiserror::Error;

/// Errors from push channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The WebSocket connection could not be established.
    #[error("failed to connect push channel: {context}")]
    ConnectFailed {
        /// What went wrong during the handshake.
        context: String,
    },

    /// An operation timed out.
    #[error("timed out after {timeout_ms}ms: {context}")]
    Timeout {
        /// How long we waited.
        timeout_ms: u64,
        /// What we were waiting for.
        context: String,
    },

    /// The channel task has exited and can no longer accept commands.
    #[error("push channel closed")]
    Closed,
}
