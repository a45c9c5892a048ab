//! The authentication contract consumed by the orchestrator.
//!
//! Sign-in and sign-up flows live elsewhere; sync only needs to know
//! whether the capability is enabled and which principal it operates for.

use serde::{Deserialize, Serialize};

/// The authenticated identity remote sync operates under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Opaque user id; namespaces the remote attempt documents
    pub uid: String,
}

/// Snapshot of the auth collaborator's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Whether cloud sync is configured at all
    pub enabled: bool,
    /// The signed-in principal, if any
    pub principal: Option<Principal>,
}

impl AuthState {
    /// Sync capability not configured.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Capability configured, nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            enabled: true,
            principal: None,
        }
    }

    /// Capability configured and a principal signed in.
    pub fn signed_in(uid: impl Into<String>) -> Self {
        Self {
            enabled: true,
            principal: Some(Principal { uid: uid.into() }),
        }
    }

    /// Whether sync can actually run.
    pub fn is_authenticated(&self) -> bool {
        self.enabled && self.principal.is_some()
    }
}
