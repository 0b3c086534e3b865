//! Enabled-service set
//!
//! Shared between the shell, the view switcher and the signal aggregators.
//! Mutation happens only through the shell; a disabled id must never have a
//! live surface, which the lifecycle manager enforces on toggle.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::registry::ServiceRegistry;

#[derive(Clone, Default)]
pub struct EnabledServices {
    inner: Arc<RwLock<HashMap<String, bool>>>,
}

impl EnabledServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the set for every registered session: the persisted flag where
    /// one exists, enabled otherwise (new services default on).
    pub fn seed(registry: &ServiceRegistry, persisted: &HashMap<String, bool>) -> Self {
        let mut map = HashMap::with_capacity(registry.len());
        for config in registry.iter() {
            let flag = persisted.get(&config.id).copied().unwrap_or(true);
            map.insert(config.id.clone(), flag);
        }

        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.inner.read().get(id).copied().unwrap_or(false)
    }

    /// Flip a single flag, leaving every other key untouched.
    pub fn set(&self, id: &str, enabled: bool) {
        self.inner.write().insert(id.to_string(), enabled);
    }

    pub fn snapshot(&self) -> HashMap<String, bool> {
        self.inner.read().clone()
    }

    /// Enabled session ids in canonical registry order.
    pub fn enabled_in_order(&self, registry: &ServiceRegistry) -> Vec<String> {
        let map = self.inner.read();
        registry
            .iter()
            .filter(|c| map.get(&c.id).copied().unwrap_or(false))
            .map(|c| c.id.clone())
            .collect()
    }

    /// First enabled session in canonical order, the fallback active view.
    pub fn first_enabled(&self, registry: &ServiceRegistry) -> Option<String> {
        self.enabled_in_order(registry).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SessionConfig, TrustClass};
    use url::Url;

    fn registry() -> ServiceRegistry {
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
        ServiceRegistry::new(configs).unwrap()
    }

    #[test]
    fn test_seed_defaults_on() {
        let registry = registry();
        let mut persisted = HashMap::new();
        persisted.insert("chat".to_string(), false);

        let enabled = EnabledServices::seed(&registry, &persisted);

        assert!(enabled.is_enabled("mail"));
        assert!(!enabled.is_enabled("chat"));
        assert!(enabled.is_enabled("calendar"));
        assert!(!enabled.is_enabled("unknown"));
    }

    #[test]
    fn test_toggle_is_isolated() {
        let registry = registry();
        let enabled = EnabledServices::seed(&registry, &HashMap::new());

        let before = enabled.snapshot();
        enabled.set("chat", false);
        let after = enabled.snapshot();

        assert_eq!(after.get("chat"), Some(&false));
        for (id, flag) in &before {
            if id != "chat" {
                assert_eq!(after.get(id), Some(flag));
            }
        }
    }

    #[test]
    fn test_canonical_helpers() {
        let registry = registry();
        let enabled = EnabledServices::seed(&registry, &HashMap::new());
        enabled.set("mail", false);

        assert_eq!(enabled.enabled_in_order(&registry), vec!["chat", "calendar"]);
        assert_eq!(enabled.first_enabled(&registry).as_deref(), Some("chat"));

        enabled.set("chat", false);
        enabled.set("calendar", false);
        assert!(enabled.first_enabled(&registry).is_none());
    }
}
