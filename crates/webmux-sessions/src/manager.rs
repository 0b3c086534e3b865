//! Lifecycle manager
//!
//! Sole owner of the instance map. Creation honors the trust-class policy,
//! startup creation is isolated per session, and `load` is idempotent until
//! the surface is destroyed.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use webmux_registry::{EnabledServices, ServiceRegistry};

use crate::error::LifecycleError;
use crate::instance::SessionInstance;
use crate::policy::{decide_navigation, NavigationDisposition, NavigationRequest, SecurityPolicy};
use crate::surface::SurfaceBackend;
use crate::Result;

pub struct LifecycleManager {
    registry: Arc<ServiceRegistry>,
    backend: Arc<dyn SurfaceBackend>,
    instances: RwLock<HashMap<String, SessionInstance>>,
}

impl LifecycleManager {
    pub fn new(registry: Arc<ServiceRegistry>, backend: Arc<dyn SurfaceBackend>) -> Self {
        Self {
            registry,
            backend,
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Instantiate the surface for `id` under its trust-class policy.
    /// Creating an already-live session is a no-op.
    pub fn create(&self, id: &str) -> Result<()> {
        let config = self
            .registry
            .get(id)
            .ok_or_else(|| LifecycleError::UnknownSession(id.to_string()))?;

        if self.instances.read().contains_key(id) {
            tracing::debug!(session_id = %id, "Surface already instantiated");
            return Ok(());
        }

        let policy = SecurityPolicy::for_trust_class(config.trust, &config.partition);
        self.backend.create_surface(config, &policy)?;

        self.instances
            .write()
            .insert(id.to_string(), SessionInstance::new(id.to_string(), policy));

        tracing::info!(session_id = %id, trust = %config.trust, "Created session surface");

        Ok(())
    }

    /// Create surfaces for every enabled session. A failure for one config
    /// is logged and skipped; the rest still come up. Returns how many
    /// surfaces were created.
    pub fn create_enabled(&self, enabled: &EnabledServices) -> usize {
        let mut created = 0;

        for id in enabled.enabled_in_order(&self.registry) {
            match self.create(&id) {
                Ok(()) => created += 1,
                Err(e) => {
                    tracing::error!(session_id = %id, error = %e, "Session creation failed, continuing with remaining sessions");
                }
            }
        }

        created
    }

    /// Load the session origin into its surface. Returns `true` when a load
    /// was issued, `false` when the surface was already loaded (no-op).
    pub fn load(&self, id: &str) -> Result<bool> {
        let config = self
            .registry
            .get(id)
            .ok_or_else(|| LifecycleError::UnknownSession(id.to_string()))?;

        {
            let instances = self.instances.read();
            let instance = instances
                .get(id)
                .ok_or_else(|| LifecycleError::NotInstantiated(id.to_string()))?;
            if instance.loaded {
                return Ok(false);
            }
        }

        self.backend.load(id, &config.origin)?;

        if let Some(instance) = self.instances.write().get_mut(id) {
            instance.mark_loaded();
        }

        tracing::info!(session_id = %id, url = %config.origin, "Loading session");

        Ok(true)
    }

    pub fn is_instantiated(&self, id: &str) -> bool {
        self.instances.read().contains_key(id)
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.instances
            .read()
            .get(id)
            .map(|i| i.loaded)
            .unwrap_or(false)
    }

    pub fn focus(&self, id: &str) {
        if self.is_instantiated(id) {
            self.backend.focus(id);
        }
    }

    pub fn blur(&self, id: &str) {
        if self.is_instantiated(id) {
            self.backend.blur(id);
        }
    }

    /// Detach and release the surface, e.g. when its service is disabled.
    pub fn destroy(&self, id: &str) {
        if self.instances.write().remove(id).is_some() {
            self.backend.destroy(id);
            tracing::info!(session_id = %id, "Destroyed session surface");
        }
    }

    pub fn apply_zoom(&self, id: &str, factor: f64) {
        if self.is_instantiated(id) {
            self.backend.set_zoom(id, factor);
        }
    }

    /// Apply the outbound-navigation policy to a session's request. External
    /// targets are handed to the OS handler here; the caller only learns the
    /// disposition.
    pub fn handle_navigation(&self, id: &str, request: &NavigationRequest) -> NavigationDisposition {
        let disposition = decide_navigation(request);

        if disposition == NavigationDisposition::OpenExternal {
            tracing::debug!(
                session_id = %id,
                target = %request.target,
                "Redirecting navigation to the OS external handler"
            );
            self.backend.open_external(&request.target);
        }

        disposition
    }

    pub fn backend(&self) -> &Arc<dyn SurfaceBackend> {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{HeadlessBackend, SurfaceOp};
    use std::collections::HashMap as StdHashMap;
    use url::Url;
    use webmux_registry::{SessionConfig, TrustClass};

    fn registry() -> Arc<ServiceRegistry> {
        let configs = ["mail", "chat", "drive"]
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
        Arc::new(ServiceRegistry::new(configs).unwrap())
    }

    fn manager() -> (Arc<HeadlessBackend>, LifecycleManager) {
        let backend = Arc::new(HeadlessBackend::new());
        let manager = LifecycleManager::new(registry(), backend.clone());
        (backend, manager)
    }

    #[test]
    fn test_create_enabled_isolates_failures() {
        let (backend, manager) = manager();
        backend.fail_creation_of("chat");

        let enabled = EnabledServices::seed(&registry(), &StdHashMap::new());
        let created = manager.create_enabled(&enabled);

        assert_eq!(created, 2);
        assert!(manager.is_instantiated("mail"));
        assert!(!manager.is_instantiated("chat"));
        assert!(manager.is_instantiated("drive"));
    }

    #[test]
    fn test_load_is_idempotent() {
        let (backend, manager) = manager();
        manager.create("mail").unwrap();

        assert!(manager.load("mail").unwrap());
        assert!(!manager.load("mail").unwrap());
        assert!(!manager.load("mail").unwrap());

        let loads = backend
            .ops()
            .into_iter()
            .filter(|op| matches!(op, SurfaceOp::Loaded { .. }))
            .count();
        assert_eq!(loads, 1);
    }

    #[test]
    fn test_load_requires_surface() {
        let (_backend, manager) = manager();

        assert!(matches!(
            manager.load("mail"),
            Err(LifecycleError::NotInstantiated(_))
        ));
        assert!(matches!(
            manager.load("unknown"),
            Err(LifecycleError::UnknownSession(_))
        ));
    }

    #[test]
    fn test_destroy_releases_and_resets_load_state() {
        let (backend, manager) = manager();
        manager.create("mail").unwrap();
        manager.load("mail").unwrap();

        manager.destroy("mail");
        assert!(!manager.is_instantiated("mail"));
        assert!(!manager.is_loaded("mail"));
        assert!(backend
            .ops()
            .contains(&SurfaceOp::Destroyed("mail".to_string())));

        // Re-creating starts over with a fresh load
        manager.create("mail").unwrap();
        assert!(manager.load("mail").unwrap());
    }

    #[test]
    fn test_navigation_redirects_new_windows() {
        let (backend, manager) = manager();
        manager.create("mail").unwrap();

        let request = NavigationRequest {
            target: Url::parse("https://elsewhere.example.com/doc").unwrap(),
            new_window: true,
        };
        let disposition = manager.handle_navigation("mail", &request);

        assert_eq!(disposition, NavigationDisposition::OpenExternal);
        assert!(backend.ops().contains(&SurfaceOp::OpenedExternal(
            "https://elsewhere.example.com/doc".to_string()
        )));
    }

    #[test]
    fn test_content_surface_is_unprivileged() {
        let (backend, manager) = manager();
        manager.create("mail").unwrap();

        assert!(backend.ops().contains(&SurfaceOp::Created {
            id: "mail".to_string(),
            privileged: false,
        }));
    }
}
