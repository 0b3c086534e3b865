//! Keyboard shortcut ordinals
//!
//! Ordinals 1..N map onto the enabled sessions in canonical registry order.
//! The shortcut for a service shifts when an earlier one is disabled, which
//! matches what the tab strip shows.

use webmux_registry::{EnabledServices, ServiceRegistry};

/// Resolve a 1-based shortcut ordinal to its session id.
pub fn service_for_ordinal(
    registry: &ServiceRegistry,
    enabled: &EnabledServices,
    ordinal: usize,
) -> Option<String> {
    if ordinal == 0 {
        return None;
    }

    enabled.enabled_in_order(registry).into_iter().nth(ordinal - 1)
}
