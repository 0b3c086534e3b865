//! webmux core
//!
//! Central coordination layer for the webmux shell: one `Shell` context
//! object owns the session registry, both bus endpoints, the lifecycle
//! manager, the active-view state machine and the signal aggregators. The
//! embedding layer supplies `PlatformHooks` and feeds surface events in;
//! everything else flows over the validated message bus.

mod config;
mod error;
mod settings;
mod shell;
mod shortcuts;

pub use config::ShellConfig;
pub use error::ShellError;
pub use settings::{SettingsStore, WindowBounds};
pub use shell::{PlatformHooks, ServicesSnapshot, Shell};
pub use shortcuts::service_for_ordinal;

// Re-export core components
pub use webmux_bus::{
    InboundChannel, InboundMessage, MessageBus, OutboundChannel, OutboundMessage, Subscription,
    TrafficDecision, TrafficVerdict, INBOUND_CHANNELS, OUTBOUND_CHANNELS,
};
pub use webmux_registry::{
    EnabledServices, RegistryError, ServiceRegistry, SessionConfig, TrustClass,
};
pub use webmux_sessions::{
    decide_navigation, HeadlessBackend, LifecycleError, LifecycleManager, NavigationDisposition,
    NavigationRequest, SecurityPolicy, SessionInstance, SurfaceBackend, SurfaceOp,
};
pub use webmux_signals::{
    BadgeAggregator, Capability, DockBadge, FaviconProxy, NotificationRelay, Notifier,
    NullActivator, NullDock, NullNotifier, OsNotification, PermissionPolicy, SignalError,
    WindowActivator,
};
pub use webmux_storage::{keys, Database, StorageError};
pub use webmux_views::{ViewError, ViewSwitcher};

pub type Result<T> = std::result::Result<T, ShellError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
