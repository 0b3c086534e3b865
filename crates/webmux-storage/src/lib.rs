//! webmux storage layer
//!
//! SQLite-backed persistence for orchestration metadata: window bounds,
//! last-active tab, the enabled-service map and per-session zoom factors.
//! Session content (mail, credentials, page data) is never stored here.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

/// Names of the persisted settings. The store itself is schema-free; these
/// are the only keys the orchestrator writes.
pub mod keys {
    pub const WINDOW_BOUNDS: &str = "windowBounds";
    pub const LAST_TAB: &str = "lastTab";
    pub const SERVICES: &str = "services";
    pub const ZOOM_LEVELS: &str = "zoomLevels";
}

pub type Result<T> = std::result::Result<T, StorageError>;
