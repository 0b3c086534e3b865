//! Session configuration
//!
//! One entry per hosted service, read once at startup. The shell UI session
//! and third-party content sessions share the same config shape but carry
//! different trust classes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Trust class of an embedded session.
///
/// `Shell` is the orchestrator's own UI surface and gets elevated access to
/// native facilities. `Content` is third-party page content and runs in a
/// privilege-stripped context behind the message bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustClass {
    Shell,
    Content,
}

impl TrustClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustClass::Shell => "shell",
            TrustClass::Content => "content",
        }
    }

    /// Whether sessions of this class may touch native facilities directly.
    pub fn is_privileged(&self) -> bool {
        matches!(self, TrustClass::Shell)
    }
}

impl std::fmt::Display for TrustClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TrustClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shell" => Ok(TrustClass::Shell),
            "content" => Ok(TrustClass::Content),
            _ => Err(format!("Unknown trust class: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Stable identifier, also the wire id on bus messages
    pub id: String,
    /// Display title for the tab strip
    pub title: String,
    /// Origin the session loads on first activation
    pub origin: Url,
    /// Credential-partition name isolating cookies/storage per service
    pub partition: String,
    /// Trust class driving the security policy snapshot
    pub trust: TrustClass,
    /// Bundled fallback icon, if any
    pub icon_path: Option<PathBuf>,
}

impl SessionConfig {
    pub fn is_content(&self) -> bool {
        self.trust == TrustClass::Content
    }
}
