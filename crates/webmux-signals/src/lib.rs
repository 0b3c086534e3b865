//! webmux signal aggregation
//!
//! Turns per-session signals into OS-level indicators: unread counts become
//! the dock badge total, remote favicons become self-contained data URLs,
//! and notification intents become OS notifications with tracked handles.
//! Every entry point ignores sources that are not enabled content sessions,
//! so a fault or a lie in one session never leaks into the others.

mod badge;
mod error;
mod favicon;
mod policy;
mod relay;

pub use badge::{BadgeAggregator, DockBadge, NullDock};
pub use error::SignalError;
pub use favicon::FaviconProxy;
pub use policy::{Capability, PermissionPolicy};
pub use relay::{
    NotificationRelay, Notifier, NullActivator, NullNotifier, OsNotification, WindowActivator,
};

pub type Result<T> = std::result::Result<T, SignalError>;
