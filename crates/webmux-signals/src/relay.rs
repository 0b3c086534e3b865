//! Notification relay
//!
//! Forwards "show notification" intents from sessions to the OS facility.
//! Fire-and-forget: the caller never blocks on display. Every shown
//! notification is tracked by handle until clicked or dismissed; a click
//! also pulls the shell window to the foreground.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use webmux_registry::ServiceRegistry;

use crate::policy::{Capability, PermissionPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct OsNotification {
    pub handle: String,
    pub title: String,
    pub body: String,
    pub source: String,
}

/// OS notification facility.
pub trait Notifier: Send + Sync {
    fn show(&self, notification: &OsNotification);
}

pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn show(&self, _notification: &OsNotification) {}
}

/// Brings the shell window to the foreground on notification click.
pub trait WindowActivator: Send + Sync {
    fn activate(&self);
}

pub struct NullActivator;

impl WindowActivator for NullActivator {
    fn activate(&self) {}
}

pub struct NotificationRelay {
    registry: Arc<ServiceRegistry>,
    policy: Arc<PermissionPolicy>,
    notifier: Arc<dyn Notifier>,
    window: Arc<dyn WindowActivator>,
    active: Mutex<HashSet<String>>,
}

impl NotificationRelay {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        policy: Arc<PermissionPolicy>,
        notifier: Arc<dyn Notifier>,
        window: Arc<dyn WindowActivator>,
    ) -> Self {
        Self {
            registry,
            policy,
            notifier,
            window,
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Show an OS notification for `source`, returning its handle. Unknown
    /// sources and origins outside the permission policy are a silent no-op.
    pub fn relay(&self, title: &str, body: &str, source: &str) -> Option<String> {
        let Some(config) = self.registry.get(source) else {
            tracing::debug!(source = %source, "Dropping notification from unknown source");
            return None;
        };

        if !self
            .policy
            .is_allowed(&config.origin, Capability::Notifications)
        {
            tracing::debug!(source = %source, "Notification denied by permission policy");
            return None;
        }

        let notification = OsNotification {
            handle: Uuid::new_v4().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            source: source.to_string(),
        };

        self.notifier.show(&notification);
        self.active.lock().insert(notification.handle.clone());

        tracing::debug!(source = %source, handle = %notification.handle, "Relayed notification");

        Some(notification.handle)
    }

    /// User clicked the notification: focus the shell window and untrack.
    pub fn notification_clicked(&self, handle: &str) {
        if self.active.lock().remove(handle) {
            self.window.activate();
        }
    }

    /// Notification dismissed or closed by any cause: untrack.
    pub fn notification_closed(&self, handle: &str) {
        self.active.lock().remove(handle);
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;
    use url::Url;
    use webmux_registry::{SessionConfig, TrustClass};

    struct RecordingNotifier {
        shown: PlMutex<Vec<OsNotification>>,
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, notification: &OsNotification) {
            self.shown.lock().push(notification.clone());
        }
    }

    struct RecordingActivator {
        activations: PlMutex<usize>,
    }

    impl WindowActivator for RecordingActivator {
        fn activate(&self) {
            *self.activations.lock() += 1;
        }
    }

    fn fixture() -> (
        Arc<RecordingNotifier>,
        Arc<RecordingActivator>,
        Arc<PermissionPolicy>,
        NotificationRelay,
    ) {
        let configs = vec![SessionConfig {
            id: "gmail".to_string(),
            title: "Mail".to_string(),
            origin: Url::parse("https://mail.example.com").unwrap(),
            partition: "persist:gmail".to_string(),
            trust: TrustClass::Content,
            icon_path: None,
        }];
        let registry = Arc::new(ServiceRegistry::new(configs).unwrap());
        let policy = Arc::new(PermissionPolicy::new());
        let notifier = Arc::new(RecordingNotifier {
            shown: PlMutex::new(Vec::new()),
        });
        let activator = Arc::new(RecordingActivator {
            activations: PlMutex::new(0),
        });

        let relay = NotificationRelay::new(
            registry,
            policy.clone(),
            notifier.clone() as Arc<dyn Notifier>,
            activator.clone() as Arc<dyn WindowActivator>,
        );

        (notifier, activator, policy, relay)
    }

    #[test]
    fn test_denied_origin_is_silent_noop() {
        let (notifier, _activator, _policy, relay) = fixture();

        let handle = relay.relay("New mail", "hello", "gmail");

        assert!(handle.is_none());
        assert!(notifier.shown.lock().is_empty());
        assert_eq!(relay.active_count(), 0);
    }

    #[test]
    fn test_relay_shows_and_tracks() {
        let (notifier, _activator, policy, relay) = fixture();
        policy.grant(
            &Url::parse("https://mail.example.com").unwrap(),
            Capability::Notifications,
        );

        let handle = relay.relay("New mail", "hello", "gmail").unwrap();

        let shown = notifier.shown.lock();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "New mail");
        assert_eq!(shown[0].source, "gmail");
        assert_eq!(shown[0].handle, handle);
        assert_eq!(relay.active_count(), 1);
    }

    #[test]
    fn test_click_focuses_window_and_untracks() {
        let (_notifier, activator, policy, relay) = fixture();
        policy.grant(
            &Url::parse("https://mail.example.com").unwrap(),
            Capability::Notifications,
        );

        let handle = relay.relay("New mail", "hello", "gmail").unwrap();
        relay.notification_clicked(&handle);

        assert_eq!(*activator.activations.lock(), 1);
        assert_eq!(relay.active_count(), 0);

        // Stale handle after close: no second activation
        relay.notification_clicked(&handle);
        assert_eq!(*activator.activations.lock(), 1);
    }

    #[test]
    fn test_close_untracks_without_focus() {
        let (_notifier, activator, policy, relay) = fixture();
        policy.grant(
            &Url::parse("https://mail.example.com").unwrap(),
            Capability::Notifications,
        );

        let handle = relay.relay("New mail", "hello", "gmail").unwrap();
        relay.notification_closed(&handle);

        assert_eq!(relay.active_count(), 0);
        assert_eq!(*activator.activations.lock(), 0);
    }

    #[test]
    fn test_unknown_source_is_silent_noop() {
        let (notifier, _activator, _policy, relay) = fixture();

        assert!(relay.relay("t", "b", "nobody").is_none());
        assert!(notifier.shown.lock().is_empty());
    }
}
