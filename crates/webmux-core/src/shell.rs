//! Orchestrator shell
//!
//! The one explicit context object for the process: constructed at startup,
//! torn down at exit, no ambient globals. It owns the bus endpoints, wires
//! every inbound channel to its component, and carries the durable
//! orchestration metadata (window bounds, enabled services, zoom levels)
//! through the settings store.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use webmux_bus::{InboundChannel, InboundMessage, MessageBus, Subscription};
use webmux_registry::{EnabledServices, ServiceRegistry};
use webmux_sessions::{HeadlessBackend, LifecycleManager, SurfaceBackend};
use webmux_signals::{
    BadgeAggregator, Capability, DockBadge, FaviconProxy, NotificationRelay, Notifier,
    NullActivator, NullDock, NullNotifier, PermissionPolicy, WindowActivator,
};
use webmux_storage::Database;
use webmux_views::ViewSwitcher;

use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::settings::{SettingsStore, WindowBounds};
use crate::shortcuts::service_for_ordinal;
use crate::Result;

/// Native facilities the orchestrator drives. The embedding layer provides
/// real implementations; the null set keeps everything runnable headless.
pub struct PlatformHooks {
    pub backend: Arc<dyn SurfaceBackend>,
    pub dock: Arc<dyn DockBadge>,
    pub notifier: Arc<dyn Notifier>,
    pub window: Arc<dyn WindowActivator>,
}

impl PlatformHooks {
    /// Recording surfaces, discarded indicators.
    pub fn headless() -> Self {
        Self {
            backend: Arc::new(HeadlessBackend::new()),
            dock: Arc::new(NullDock),
            notifier: Arc::new(NullNotifier),
            window: Arc::new(NullActivator),
        }
    }
}

/// Reply payload for `get-enabled-services`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesSnapshot {
    pub services: BTreeMap<String, bool>,
    pub active_tab: Option<String>,
}

pub struct Shell {
    config: ShellConfig,
    db: Database,
    settings: SettingsStore,
    registry: Arc<ServiceRegistry>,
    enabled: EnabledServices,
    inbound: MessageBus,
    outbound: MessageBus,
    lifecycle: Arc<LifecycleManager>,
    views: Arc<ViewSwitcher>,
    badges: Arc<BadgeAggregator>,
    favicons: Arc<FaviconProxy>,
    permissions: Arc<PermissionPolicy>,
    notifications: Arc<NotificationRelay>,
    zoom: RwLock<HashMap<String, f64>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl Shell {
    pub fn new(
        config: ShellConfig,
        registry: ServiceRegistry,
        platform: PlatformHooks,
        runtime: tokio::runtime::Handle,
    ) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::open(&config.database_path)?;
        let settings = SettingsStore::new(db.clone());

        let registry = Arc::new(registry);
        let persisted = settings.services()?;
        let enabled = EnabledServices::seed(&registry, &persisted);

        let inbound = MessageBus::inbound();
        let outbound = MessageBus::outbound();

        let lifecycle = Arc::new(LifecycleManager::new(registry.clone(), platform.backend));
        let views = Arc::new(ViewSwitcher::new(
            registry.clone(),
            enabled.clone(),
            lifecycle.clone(),
            outbound.clone(),
            db.clone(),
        ));
        let badges = Arc::new(BadgeAggregator::new(
            registry.clone(),
            enabled.clone(),
            outbound.clone(),
            platform.dock,
        ));
        let favicons = Arc::new(FaviconProxy::new(
            registry.clone(),
            enabled.clone(),
            outbound.clone(),
            runtime,
        )?);
        let permissions = Arc::new(PermissionPolicy::new());
        let notifications = Arc::new(NotificationRelay::new(
            registry.clone(),
            permissions.clone(),
            platform.notifier,
            platform.window,
        ));

        Ok(Self {
            config,
            db,
            settings,
            registry,
            enabled,
            inbound,
            outbound,
            lifecycle,
            views,
            badges,
            favicons,
            permissions,
            notifications,
            zoom: RwLock::new(HashMap::new()),
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    /// Restore persisted state, grant notification permissions, bring up
    /// surfaces (eagerly if configured) and start routing inbound traffic.
    pub fn initialize(&self) -> Result<()> {
        for config in self.registry.content_sessions() {
            if self.enabled.is_enabled(&config.id) {
                self.permissions
                    .grant(&config.origin, Capability::Notifications);
            }
        }

        *self.zoom.write() = self.settings.zoom_levels()?;

        if self.config.eager_load {
            self.lifecycle.create_enabled(&self.enabled);
        }

        self.register_inbound();

        self.views.restore_initial()?;

        tracing::info!(
            services = self.registry.len(),
            active = ?self.views.active(),
            "Shell initialized"
        );

        Ok(())
    }

    fn register_inbound(&self) {
        let dispatcher = Arc::new(Dispatcher {
            views: Arc::clone(&self.views),
            badges: Arc::clone(&self.badges),
            favicons: Arc::clone(&self.favicons),
            notifications: Arc::clone(&self.notifications),
            enabled: self.enabled.clone(),
        });

        let mut subscriptions = self.subscriptions.lock();
        for channel in InboundChannel::ALL {
            let dispatcher = Arc::clone(&dispatcher);
            let channel = *channel;
            subscriptions.push(
                self.inbound
                    .subscribe(channel.as_str(), move |payload| {
                        dispatcher.dispatch(channel, payload)
                    }),
            );
        }
    }

    // === Bus endpoints ===

    /// Where session observers and the shell UI deliver their messages.
    pub fn inbound(&self) -> &MessageBus {
        &self.inbound
    }

    /// Where the shell UI subscribes for orchestrator signals.
    pub fn outbound(&self) -> &MessageBus {
        &self.outbound
    }

    // === View operations ===

    pub fn active_view(&self) -> Option<String> {
        self.views.active()
    }

    pub fn switch_to(&self, id: &str) -> Result<()> {
        Ok(self.views.switch_to(id)?)
    }

    /// Keyboard shortcut ordinal 1..N over the enabled canonical order.
    pub fn handle_shortcut(&self, ordinal: usize) -> Option<String> {
        let id = service_for_ordinal(&self.registry, &self.enabled, ordinal)?;

        match self.views.switch_to(&id) {
            Ok(()) => Some(id),
            Err(e) => {
                tracing::debug!(session_id = %id, error = %e, "Shortcut switch ignored");
                None
            }
        }
    }

    /// Completion signal from the surface layer; turns the loading
    /// indicator off and applies the persisted zoom factor.
    pub fn surface_did_finish_load(&self, id: &str) {
        self.views.surface_did_finish_load(id);

        if let Some(factor) = self.zoom_for(id) {
            self.lifecycle.apply_zoom(id, factor);
        }
    }

    /// Permission decision for a surface capability request (notifications,
    /// media). A denial is a silent no-op for the requesting session.
    pub fn capability_requested(&self, id: &str, capability: Capability) -> bool {
        let Some(config) = self.registry.get(id) else {
            return false;
        };

        let allowed = self.permissions.is_allowed(&config.origin, capability);
        if !allowed {
            tracing::debug!(session_id = %id, capability = %capability, "Capability request denied");
        }

        allowed
    }

    // === Service toggling ===

    /// Enable or disable a service. Disabling detaches the surface live,
    /// prunes its badge, revokes its notification grant and falls the
    /// active view back to the first enabled session.
    pub fn set_service_enabled(&self, id: &str, enable: bool) -> Result<()> {
        let config = self
            .registry
            .get(id)
            .ok_or_else(|| ShellError::UnknownService(id.to_string()))?;

        if self.enabled.is_enabled(id) == enable {
            return Ok(());
        }

        self.enabled.set(id, enable);
        self.settings.set_service_flag(id, enable)?;

        if enable {
            if config.is_content() {
                self.permissions
                    .grant(&config.origin, Capability::Notifications);
            }

            if self.config.eager_load {
                if let Err(e) = self.lifecycle.create(id) {
                    tracing::error!(session_id = %id, error = %e, "Surface creation failed after enable");
                }
            }

            tracing::info!(session_id = %id, "Service enabled");
        } else {
            let was_active = self.views.deactivate(id);
            self.lifecycle.destroy(id);
            self.badges.retain_enabled();
            self.permissions
                .revoke(&config.origin, Capability::Notifications);

            if was_active {
                if let Some(next) = self.enabled.first_enabled(&self.registry) {
                    if let Err(e) = self.views.switch_to(&next) {
                        tracing::warn!(session_id = %next, error = %e, "Fallback switch failed");
                    }
                }
            }

            tracing::info!(session_id = %id, "Service disabled");
        }

        Ok(())
    }

    pub fn services_snapshot(&self) -> ServicesSnapshot {
        ServicesSnapshot {
            services: self.enabled.snapshot().into_iter().collect(),
            active_tab: self.views.active(),
        }
    }

    // === Zoom ===

    /// Zoom-change event from a surface; stored and persisted, re-applied
    /// on every load.
    pub fn surface_zoom_changed(&self, id: &str, factor: f64) -> Result<()> {
        if !self.registry.contains(id) {
            return Err(ShellError::UnknownService(id.to_string()));
        }

        self.zoom.write().insert(id.to_string(), factor);
        self.settings.set_zoom_level(id, factor)?;

        Ok(())
    }

    pub fn zoom_for(&self, id: &str) -> Option<f64> {
        self.zoom.read().get(id).copied()
    }

    // === Window geometry ===

    pub fn window_bounds(&self) -> Result<Option<WindowBounds>> {
        Ok(self.settings.window_bounds()?)
    }

    pub fn set_window_bounds(&self, bounds: &WindowBounds) -> Result<()> {
        Ok(self.settings.set_window_bounds(bounds)?)
    }

    // === Component access ===

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn enabled_services(&self) -> &EnabledServices {
        &self.enabled
    }

    pub fn badges(&self) -> &BadgeAggregator {
        &self.badges
    }

    pub fn notifications(&self) -> &NotificationRelay {
        &self.notifications
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }
}

/// Routes parsed inbound messages to their components. Lives behind the
/// bus subscriptions, so it only holds what the handlers need.
struct Dispatcher {
    views: Arc<ViewSwitcher>,
    badges: Arc<BadgeAggregator>,
    favicons: Arc<FaviconProxy>,
    notifications: Arc<NotificationRelay>,
    enabled: EnabledServices,
}

impl Dispatcher {
    fn dispatch(&self, channel: InboundChannel, payload: &Value) -> Option<Value> {
        let message = match InboundMessage::parse(channel, payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropped message with malformed payload");
                return None;
            }
        };

        match message {
            InboundMessage::SwitchTab { tab_id } => {
                if let Err(e) = self.views.switch_to(&tab_id) {
                    tracing::debug!(tab_id = %tab_id, error = %e, "Ignored switch request");
                }
                None
            }
            InboundMessage::UpdateBadge { source, count } => {
                self.badges.update_count(&source, count);
                None
            }
            InboundMessage::UpdateFavicon {
                source,
                favicon_url,
            } => {
                self.favicons.update_icon(&source, &favicon_url);
                None
            }
            InboundMessage::ShowNotification {
                title,
                body,
                source,
            } => {
                self.notifications.relay(&title, &body, &source);
                None
            }
            InboundMessage::ShowContextMenu => {
                // Menu construction belongs to the embedder; admitting the
                // channel is this layer's job.
                tracing::debug!("Service-visibility menu requested");
                None
            }
            InboundMessage::GetEnabledServices => {
                let snapshot = ServicesSnapshot {
                    services: self.enabled.snapshot().into_iter().collect(),
                    active_tab: self.views.active(),
                };
                serde_json::to_value(snapshot).ok()
            }
        }
    }
}
