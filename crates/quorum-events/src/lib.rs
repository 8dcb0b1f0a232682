//! # quorum-events
//!
//! Wire types for the Quorum push channel.
//!
//! - **`ServerEvent`**: the closed enumeration of inbound events, carried as
//!   an adjacently tagged JSON envelope (`{"event": ..., "data": ...}`)
//! - **`ClientCommand`**: outbound subscription control messages
//!
//! Events are transient: each is consumed once by the synchronizer and the
//! notification rules, then discarded. Unknown event names and malformed
//! frames are dropped at parse, never surfaced as errors.

#![deny(unsafe_code)]

pub mod command;
pub mod server_event;

pub use command::ClientCommand;
pub use server_event::ServerEvent;
