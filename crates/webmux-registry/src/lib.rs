//! webmux session registry
//!
//! The static list of hosted services: one `SessionConfig` per embedded
//! session, validated once at startup and immutable for the process
//! lifetime. The registry also owns the canonical display order and the
//! shared enabled-service set that gates every other component.

mod config;
mod enabled;
mod error;
mod registry;

pub use config::{SessionConfig, TrustClass};
pub use enabled::EnabledServices;
pub use error::RegistryError;
pub use registry::ServiceRegistry;

pub type Result<T> = std::result::Result<T, RegistryError>;
