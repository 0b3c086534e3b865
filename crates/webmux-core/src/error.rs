//! Shell error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Storage error: {0}")]
    Storage(#[from] webmux_storage::StorageError),

    #[error("Registry error: {0}")]
    Registry(#[from] webmux_registry::RegistryError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] webmux_sessions::LifecycleError),

    #[error("View error: {0}")]
    View(#[from] webmux_views::ViewError),

    #[error("Signal error: {0}")]
    Signal(#[from] webmux_signals::SignalError),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for ShellError {
    fn from(e: std::io::Error) -> Self {
        ShellError::Config(e.to_string())
    }
}
