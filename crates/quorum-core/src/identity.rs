//! Session identity as supplied by the host application.
//!
//! The sync client never authenticates on its own: the login flow (out of
//! scope here) produces an [`Identity`] and hands it to the bridge; logout
//! withdraws it. Identity changes drive channel teardown and reconnection.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Viewer role, used to gate notifications and admin-scoped cache actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator: manages polls and sees voting activity.
    Admin,
    /// Regular voter.
    Voter,
}

impl Role {
    /// Whether this role is [`Role::Admin`].
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// The authenticated session identity.
///
/// Read-only from the bridge's point of view: created at login, destroyed at
/// logout. The token authenticates the push channel handshake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque auth token carried on the channel handshake.
    pub token: String,
    /// The signed-in user.
    pub user_id: UserId,
    /// Viewer role.
    pub role: Role,
}

impl Identity {
    /// Create a new identity.
    pub fn new(token: impl Into<String>, user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            role,
        }
    }
}
