//! # quorum-core
//!
//! Foundation types for the Quorum real-time sync client.
//!
//! This crate provides the shared vocabulary the other Quorum crates depend on:
//!
//! - **Branded IDs**: `PollId`, `UserId` as newtypes for type safety
//! - **Identity**: the session identity (`token`, `user_id`, `role`) the host
//!   application supplies at login and withdraws at logout
//! - **Errors**: `ChannelError` hierarchy via `thiserror`

#![deny(unsafe_code)]

pub mod errors;
pub mod identity;
pub mod ids;

pub use errors::ChannelError;
pub use identity::{Identity, Role};
pub use ids::{PollId, UserId};
