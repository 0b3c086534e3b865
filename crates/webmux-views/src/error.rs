//! View error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Service is disabled or unknown: {0}")]
    NotEnabled(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] webmux_sessions::LifecycleError),

    #[error("Storage error: {0}")]
    Storage(#[from] webmux_storage::StorageError),
}
