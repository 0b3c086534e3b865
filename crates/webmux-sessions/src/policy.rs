//! Security and navigation policy
//!
//! The policy snapshot is derived exhaustively from the trust class; there
//! is no per-service override surface. Background throttling stays off for
//! every session so hidden services keep producing badge and notification
//! signals.

use serde::{Deserialize, Serialize};
use url::Url;

use webmux_registry::TrustClass;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Elevated access to native facilities (shell UI surface only)
    pub privileged: bool,
    /// Cookie/storage partition the surface is confined to
    pub credential_partition: String,
    /// Direct native capability access (never granted to content)
    pub native_capabilities: bool,
    /// Suspension of hidden surfaces; disabled so signals never go stale
    pub background_throttling: bool,
}

impl SecurityPolicy {
    pub fn for_trust_class(trust: TrustClass, partition: &str) -> Self {
        match trust {
            TrustClass::Shell => Self {
                privileged: true,
                credential_partition: partition.to_string(),
                native_capabilities: true,
                background_throttling: false,
            },
            TrustClass::Content => Self {
                privileged: false,
                credential_partition: partition.to_string(),
                native_capabilities: false,
                background_throttling: false,
            },
        }
    }
}

/// A session's attempt to navigate somewhere.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub target: Url,
    /// Whether the session asked for a new top-level window
    pub new_window: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDisposition {
    /// Navigation proceeds inside the session's own surface
    AllowInPlace,
    /// Target is handed to the OS default external handler
    OpenExternal,
}

/// New top-level destinations never open in-app; neither do schemes the
/// embedded surfaces cannot host (mailto:, tel:, ...).
pub fn decide_navigation(request: &NavigationRequest) -> NavigationDisposition {
    if request.new_window {
        return NavigationDisposition::OpenExternal;
    }

    match request.target.scheme() {
        "http" | "https" => NavigationDisposition::AllowInPlace,
        _ => NavigationDisposition::OpenExternal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_policy_is_stripped() {
        let policy = SecurityPolicy::for_trust_class(TrustClass::Content, "persist:mail");
        assert!(!policy.privileged);
        assert!(!policy.native_capabilities);
        assert!(!policy.background_throttling);
        assert_eq!(policy.credential_partition, "persist:mail");
    }

    #[test]
    fn test_shell_policy_is_elevated() {
        let policy = SecurityPolicy::for_trust_class(TrustClass::Shell, "persist:shell");
        assert!(policy.privileged);
        assert!(policy.native_capabilities);
        // Throttling stays off even for the privileged surface
        assert!(!policy.background_throttling);
    }

    #[test]
    fn test_new_window_goes_external() {
        let request = NavigationRequest {
            target: Url::parse("https://docs.example.com/page").unwrap(),
            new_window: true,
        };
        assert_eq!(decide_navigation(&request), NavigationDisposition::OpenExternal);
    }

    #[test]
    fn test_in_place_http_is_allowed() {
        let request = NavigationRequest {
            target: Url::parse("https://mail.example.com/inbox").unwrap(),
            new_window: false,
        };
        assert_eq!(decide_navigation(&request), NavigationDisposition::AllowInPlace);
    }

    #[test]
    fn test_foreign_scheme_goes_external() {
        let request = NavigationRequest {
            target: Url::parse("mailto:someone@example.com").unwrap(),
            new_window: false,
        };
        assert_eq!(decide_navigation(&request), NavigationDisposition::OpenExternal);
    }
}
