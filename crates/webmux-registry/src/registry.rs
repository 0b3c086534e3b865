//! Service registry
//!
//! Validated at construction; iteration order is the canonical order used
//! for the tab strip, shortcut ordinals and active-view fallback.

use std::collections::HashMap;

use crate::config::{SessionConfig, TrustClass};
use crate::error::RegistryError;
use crate::Result;

pub struct ServiceRegistry {
    configs: Vec<SessionConfig>,
    index: HashMap<String, usize>,
}

impl ServiceRegistry {
    pub fn new(configs: Vec<SessionConfig>) -> Result<Self> {
        let mut index = HashMap::with_capacity(configs.len());

        for (pos, config) in configs.iter().enumerate() {
            if config.id.trim().is_empty() {
                return Err(RegistryError::EmptyId);
            }

            if index.insert(config.id.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateId(config.id.clone()));
            }

            // Content sessions must be reachable origins; the shell surface
            // may use a custom privileged scheme.
            if config.trust == TrustClass::Content {
                let scheme = config.origin.scheme();
                if scheme != "http" && scheme != "https" {
                    return Err(RegistryError::InvalidOrigin {
                        id: config.id.clone(),
                        origin: config.origin.to_string(),
                    });
                }

                if config.partition.trim().is_empty() {
                    return Err(RegistryError::MissingPartition(config.id.clone()));
                }
            }
        }

        tracing::debug!(count = configs.len(), "Service registry loaded");

        Ok(Self { configs, index })
    }

    pub fn get(&self, id: &str) -> Option<&SessionConfig> {
        self.index.get(id).map(|pos| &self.configs[*pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All sessions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &SessionConfig> {
        self.configs.iter()
    }

    /// Third-party content sessions in canonical order.
    pub fn content_sessions(&self) -> impl Iterator<Item = &SessionConfig> {
        self.configs.iter().filter(|c| c.is_content())
    }

    /// Whether `id` names a third-party content session.
    pub fn is_content_session(&self, id: &str) -> bool {
        self.get(id).map(|c| c.is_content()).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
