//! Registry error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Session id cannot be empty")]
    EmptyId,

    #[error("Duplicate session id: {0}")]
    DuplicateId(String),

    #[error("Invalid origin for session {id}: {origin}")]
    InvalidOrigin { id: String, origin: String },

    #[error("Session {0} has no credential partition")]
    MissingPartition(String),
}
