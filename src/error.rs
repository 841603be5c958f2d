use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the JSON boundary, by payload handlers, and by the relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound message is not a valid `{ "input": { ... } }` envelope
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// No handler is registered for the payload's `type`
    #[error("Unsupported payload type: {0}")]
    UnsupportedPayload(String),

    /// A handler could not interpret the payload data
    #[error("Handler '{kind}' failed: {reason}")]
    HandlerFailed { kind: String, reason: String },

    #[error("Failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("Failed to save config to {path}: {reason}")]
    ConfigSave { path: PathBuf, reason: String },

    /// The relay listener could not be bound or served
    #[error("Failed to bind relay listener: {0}")]
    Bind(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RelayError>;
