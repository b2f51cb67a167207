//! Error types for the Blackout core.

use thiserror::Error;

/// Reasons a `send_file` request is refused.
///
/// Every variant is terminal for the request and leaves the world untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Source has no such file, or its copy is itself still in flight
    #[error("File not found: {0}")]
    NotFound(String),

    /// Destination already holds a file with this name
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    /// Destination is a relay, or its concurrent transfer quota is used up
    #[error("No bandwidth for file: {0}")]
    NoBandwidth(String),

    /// Destination file-count or byte ceiling would be exceeded
    #[error("No storage space: {0}")]
    NoStorageSpace(String),

    /// Either endpoint does not exist
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Ground-to-ground transfers have no link to travel over
    #[error("No link can carry a transfer from {from} to {to}")]
    UnsupportedLink { from: String, to: String },
}

impl TransferError {
    /// Creates a storage error with the given reason.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::NoStorageSpace(reason.into())
    }

    /// Creates an unknown-entity error.
    pub fn unknown(id: impl std::fmt::Display) -> Self {
        Self::UnknownEntity(id.to_string())
    }
}

/// Errors raised while registering entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("Unknown entity type: {0}")]
    UnknownKind(String),

    #[error("Entity id already in use: {0}")]
    DuplicateId(String),

    #[error("{kind} cannot be created as a {expected}")]
    WrongCategory { kind: String, expected: &'static str },
}
