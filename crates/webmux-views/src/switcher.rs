//! View switcher
//!
//! Transition order is fixed: validate target, lazily create/load, blur the
//! previous surface, then raise the target. Between blur and focus there is
//! never more than one foregrounded session.

use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;

use webmux_bus::{MessageBus, OutboundMessage};
use webmux_registry::{EnabledServices, ServiceRegistry};
use webmux_sessions::LifecycleManager;
use webmux_storage::{keys, Database};

use crate::error::ViewError;
use crate::Result;

pub struct ViewSwitcher {
    registry: Arc<ServiceRegistry>,
    enabled: EnabledServices,
    lifecycle: Arc<LifecycleManager>,
    outbound: MessageBus,
    db: Database,
    active: RwLock<Option<String>>,
    pending_loads: Mutex<HashSet<String>>,
}

impl ViewSwitcher {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        enabled: EnabledServices,
        lifecycle: Arc<LifecycleManager>,
        outbound: MessageBus,
        db: Database,
    ) -> Self {
        Self {
            registry,
            enabled,
            lifecycle,
            outbound,
            db,
            active: RwLock::new(None),
            pending_loads: Mutex::new(HashSet::new()),
        }
    }

    pub fn active(&self) -> Option<String> {
        self.active.read().clone()
    }

    /// Restore the persisted last-active view, falling back to the first
    /// enabled session in canonical order. A restore failure leaves the
    /// shell with no active view rather than aborting startup.
    pub fn restore_initial(&self) -> Result<Option<String>> {
        let persisted = self.db.get_setting(keys::LAST_TAB)?;
        let target = persisted
            .filter(|id| self.enabled.is_enabled(id))
            .or_else(|| self.enabled.first_enabled(&self.registry));

        let Some(id) = target else {
            return Ok(None);
        };

        if let Err(e) = self.switch_to(&id) {
            tracing::warn!(session_id = %id, error = %e, "Could not restore initial view");
            return Ok(None);
        }

        Ok(Some(id))
    }

    /// Foreground `id`. Disabled or unknown targets leave the state
    /// untouched.
    pub fn switch_to(&self, id: &str) -> Result<()> {
        if !self.enabled.is_enabled(id) {
            return Err(ViewError::NotEnabled(id.to_string()));
        }

        // Lazy instantiation on first activation
        if !self.lifecycle.is_instantiated(id) {
            self.lifecycle.create(id)?;
        }

        if !self.lifecycle.is_loaded(id) {
            self.outbound.send_message(&OutboundMessage::SetLoadingState {
                service_id: id.to_string(),
                loading: true,
            });
            self.pending_loads.lock().insert(id.to_string());

            if let Err(e) = self.lifecycle.load(id) {
                self.pending_loads.lock().remove(id);
                self.outbound.send_message(&OutboundMessage::SetLoadingState {
                    service_id: id.to_string(),
                    loading: false,
                });
                return Err(e.into());
            }
        }

        let previous = self.active.read().clone();
        if let Some(prev) = previous.as_deref() {
            if prev != id {
                self.lifecycle.blur(prev);
            }
        }

        self.lifecycle.focus(id);
        *self.active.write() = Some(id.to_string());
        self.db.set_setting(keys::LAST_TAB, id)?;

        self.outbound.send_message(&OutboundMessage::SetActiveTab {
            tab_id: id.to_string(),
        });

        tracing::info!(session_id = %id, previous = ?previous, "Switched active view");

        Ok(())
    }

    /// One-shot completion signal from the surface layer: clears the
    /// pending-load marker and turns the loading indicator off, once.
    pub fn surface_did_finish_load(&self, id: &str) {
        if self.pending_loads.lock().remove(id) {
            self.outbound.send_message(&OutboundMessage::SetLoadingState {
                service_id: id.to_string(),
                loading: false,
            });
        }
    }

    /// Drop `id` as the active view, e.g. when its service is disabled.
    /// Returns `true` if it was active; the caller picks the fallback.
    pub fn deactivate(&self, id: &str) -> bool {
        self.pending_loads.lock().remove(id);

        let mut active = self.active.write();
        if active.as_deref() == Some(id) {
            *active = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;
    use serde_json::Value;
    use std::collections::HashMap;
    use url::Url;
    use webmux_sessions::{HeadlessBackend, SurfaceOp};
    use webmux_registry::{SessionConfig, TrustClass};

    struct Fixture {
        backend: Arc<HeadlessBackend>,
        switcher: ViewSwitcher,
        outbound_log: Arc<PlMutex<Vec<(String, Value)>>>,
        _subs: Vec<webmux_bus::Subscription>,
    }

    fn fixture() -> Fixture {
        let configs = ["mail", "chat", "calendar"]
            .iter()
            .map(|id| SessionConfig {
                id: id.to_string(),
                title: id.to_string(),
                origin: Url::parse(&format!("https://{}.example.com", id)).unwrap(),
                partition: format!("persist:{}", id),
                trust: TrustClass::Content,
                icon_path: None,
            })
            .collect();
        let registry = Arc::new(ServiceRegistry::new(configs).unwrap());
        let enabled = EnabledServices::seed(&registry, &HashMap::new());
        let backend = Arc::new(HeadlessBackend::new());
        let lifecycle = Arc::new(LifecycleManager::new(registry.clone(), backend.clone()));
        let outbound = MessageBus::outbound();
        let db = Database::open_in_memory().unwrap();

        let outbound_log = Arc::new(PlMutex::new(Vec::new()));
        let mut subs = Vec::new();
        for channel in ["set-active-tab", "set-loading-state"] {
            let log = Arc::clone(&outbound_log);
            subs.push(outbound.subscribe(channel, move |payload| {
                log.lock().push((channel.to_string(), payload.clone()));
                None
            }));
        }

        Fixture {
            backend,
            switcher: ViewSwitcher::new(registry, enabled, lifecycle, outbound, db),
            outbound_log,
            _subs: subs,
        }
    }

    #[test]
    fn test_switch_activates_and_persists() {
        let f = fixture();

        f.switcher.switch_to("mail").unwrap();

        assert_eq!(f.switcher.active().as_deref(), Some("mail"));
        assert_eq!(
            f.switcher.db.get_setting(keys::LAST_TAB).unwrap().as_deref(),
            Some("mail")
        );

        let log = f.outbound_log.lock();
        assert!(log
            .iter()
            .any(|(ch, p)| ch == "set-active-tab" && p["tabId"] == "mail"));
    }

    #[test]
    fn test_switch_to_disabled_leaves_state_untouched() {
        let f = fixture();
        f.switcher.switch_to("mail").unwrap();
        f.switcher.enabled.set("chat", false);

        let result = f.switcher.switch_to("chat");

        assert!(matches!(result, Err(ViewError::NotEnabled(_))));
        assert_eq!(f.switcher.active().as_deref(), Some("mail"));
        assert!(!f.switcher.lifecycle.is_instantiated("chat"));
    }

    #[test]
    fn test_switch_to_unknown_leaves_state_untouched() {
        let f = fixture();
        f.switcher.switch_to("mail").unwrap();

        assert!(f.switcher.switch_to("missing").is_err());
        assert_eq!(f.switcher.active().as_deref(), Some("mail"));
    }

    #[test]
    fn test_blur_precedes_focus() {
        let f = fixture();
        f.switcher.switch_to("mail").unwrap();
        f.switcher.switch_to("chat").unwrap();

        let ops = f.backend.ops();
        let blur = ops
            .iter()
            .position(|op| *op == SurfaceOp::Blurred("mail".to_string()))
            .unwrap();
        let focus = ops
            .iter()
            .position(|op| *op == SurfaceOp::Focused("chat".to_string()))
            .unwrap();
        assert!(blur < focus);
    }

    #[test]
    fn test_lazy_load_emits_loading_signals() {
        let f = fixture();

        f.switcher.switch_to("mail").unwrap();

        {
            let log = f.outbound_log.lock();
            assert!(log.iter().any(|(ch, p)| ch == "set-loading-state"
                && p["serviceId"] == "mail"
                && p["loading"] == true));
        }

        f.switcher.surface_did_finish_load("mail");
        // Second completion signal must not emit again
        f.switcher.surface_did_finish_load("mail");

        let log = f.outbound_log.lock();
        let off_count = log
            .iter()
            .filter(|(ch, p)| {
                ch == "set-loading-state" && p["serviceId"] == "mail" && p["loading"] == false
            })
            .count();
        assert_eq!(off_count, 1);
    }

    #[test]
    fn test_switch_back_does_not_reload() {
        let f = fixture();
        f.switcher.switch_to("mail").unwrap();
        f.switcher.switch_to("chat").unwrap();
        f.switcher.switch_to("mail").unwrap();

        let loads = f
            .backend
            .ops()
            .into_iter()
            .filter(|op| matches!(op, SurfaceOp::Loaded { id, .. } if id == "mail"))
            .count();
        assert_eq!(loads, 1);
    }

    #[test]
    fn test_restore_prefers_persisted_then_first_enabled() {
        let f = fixture();
        f.switcher.db.set_setting(keys::LAST_TAB, "chat").unwrap();
        assert_eq!(f.switcher.restore_initial().unwrap().as_deref(), Some("chat"));

        let f = fixture();
        f.switcher.db.set_setting(keys::LAST_TAB, "gone").unwrap();
        assert_eq!(f.switcher.restore_initial().unwrap().as_deref(), Some("mail"));

        let f = fixture();
        for id in ["mail", "chat", "calendar"] {
            f.switcher.enabled.set(id, false);
        }
        assert_eq!(f.switcher.restore_initial().unwrap(), None);
    }

    #[test]
    fn test_deactivate_only_clears_matching_view() {
        let f = fixture();
        f.switcher.switch_to("mail").unwrap();

        assert!(!f.switcher.deactivate("chat"));
        assert_eq!(f.switcher.active().as_deref(), Some("mail"));

        assert!(f.switcher.deactivate("mail"));
        assert_eq!(f.switcher.active(), None);
    }
}
