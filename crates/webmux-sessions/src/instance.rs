//! Session instance state

use serde::{Deserialize, Serialize};

use crate::policy::SecurityPolicy;

/// A live embedded surface. Owned exclusively by the lifecycle manager;
/// created lazily on first activation (or eagerly at startup) and destroyed
/// only at teardown or when its service is disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInstance {
    pub id: String,
    /// Whether the session origin has been loaded into the surface
    pub loaded: bool,
    /// The policy the surface was created under, kept for diagnostics
    pub policy: SecurityPolicy,
}

impl SessionInstance {
    pub fn new(id: String, policy: SecurityPolicy) -> Self {
        Self {
            id,
            loaded: false,
            policy,
        }
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }
}
