//! Badge aggregator
//!
//! Per-session unread counts, last-writer-wins. The global total is always
//! the live sum over the stored counts; it is recomputed on every change and
//! never maintained as a separate accumulator.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use webmux_bus::{MessageBus, OutboundMessage};
use webmux_registry::{EnabledServices, ServiceRegistry};

/// OS dock/taskbar unread indicator.
pub trait DockBadge: Send + Sync {
    fn set_count(&self, total: u64);
}

/// No-op indicator for headless runs.
pub struct NullDock;

impl DockBadge for NullDock {
    fn set_count(&self, _total: u64) {}
}

pub struct BadgeAggregator {
    registry: Arc<ServiceRegistry>,
    enabled: EnabledServices,
    counts: RwLock<HashMap<String, u64>>,
    outbound: MessageBus,
    dock: Arc<dyn DockBadge>,
}

impl BadgeAggregator {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        enabled: EnabledServices,
        outbound: MessageBus,
        dock: Arc<dyn DockBadge>,
    ) -> Self {
        Self {
            registry,
            enabled,
            counts: RwLock::new(HashMap::new()),
            outbound,
            dock,
        }
    }

    /// Store the latest count for `source` and push the recomputed total to
    /// the dock and the shell UI. Sources that are not enabled content
    /// sessions change nothing and emit nothing.
    pub fn update_count(&self, source: &str, raw: Option<i64>) {
        if !self.registry.is_content_session(source) || !self.enabled.is_enabled(source) {
            tracing::debug!(source = %source, "Ignoring badge update from non-enabled source");
            return;
        }

        let count = raw.filter(|c| *c >= 0).unwrap_or(0) as u64;
        self.counts.write().insert(source.to_string(), count);

        tracing::debug!(source = %source, count, "Badge count updated");

        self.emit();
    }

    /// Live sum over the stored per-session counts.
    pub fn total(&self) -> u64 {
        self.counts.read().values().sum()
    }

    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.counts.read().clone().into_iter().collect()
    }

    /// Drop counts for services that are no longer enabled, keeping the key
    /// set a subset of the enabled content sessions, and re-emit.
    pub fn retain_enabled(&self) {
        let removed = {
            let mut counts = self.counts.write();
            let before = counts.len();
            counts.retain(|id, _| self.enabled.is_enabled(id));
            before - counts.len()
        };

        if removed > 0 {
            self.emit();
        }
    }

    fn emit(&self) {
        let badges = self.counts();
        let total: u64 = badges.values().sum();

        self.dock.set_count(total);
        self.outbound
            .send_message(&OutboundMessage::UpdateMenuBadges { badges });
    }
}
