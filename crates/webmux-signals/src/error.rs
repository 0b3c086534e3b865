//! Signal error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Favicon fetch failed for {origin}: {reason}")]
    FaviconFetch { origin: String, reason: String },
}
