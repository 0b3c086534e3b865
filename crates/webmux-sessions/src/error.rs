//! Lifecycle error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Session {0} has no live surface")]
    NotInstantiated(String),

    #[error("Surface creation failed for {id}: {reason}")]
    Creation { id: String, reason: String },

    #[error("Load failed for {id}: {reason}")]
    Load { id: String, reason: String },
}
