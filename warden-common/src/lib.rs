//! Common types shared between warden-acl and warden-cli

pub mod policy;
pub mod token;

/// Shared error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid policy '{0}': {1}")]
    InvalidPolicy(String, String),

    #[error("Invalid namespace name: {0}")]
    InvalidNamespace(String),

    #[error("Invalid path pattern in namespace '{0}': {1}")]
    InvalidPathPattern(String, String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
