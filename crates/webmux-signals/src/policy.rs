//! Capability permission policy
//!
//! Per-origin allow set, default deny for every capability. Which origins
//! get granted is decided outside the consumers: the shell grants
//! notifications to the registered content origins at startup, media stays
//! denied unless the embedder grants it explicitly. The relay and the
//! surface layer only consult the decision; a denial is a silent no-op for
//! the requesting session.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Capabilities a session can request from the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Showing OS notifications through the relay
    Notifications,
    /// Camera and microphone access
    Media,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Notifications => "notifications",
            Capability::Media => "media",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Default)]
pub struct PermissionPolicy {
    granted: RwLock<HashSet<(String, Capability)>>,
}

impl PermissionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, url: &Url, capability: Capability) {
        let origin = url.origin().ascii_serialization();
        tracing::debug!(origin = %origin, capability = %capability, "Permission granted");
        self.granted.write().insert((origin, capability));
    }

    pub fn revoke(&self, url: &Url, capability: Capability) {
        let origin = url.origin().ascii_serialization();
        self.granted.write().remove(&(origin, capability));
    }

    pub fn is_allowed(&self, url: &Url, capability: Capability) -> bool {
        self.granted
            .read()
            .contains(&(url.origin().ascii_serialization(), capability))
    }
}
