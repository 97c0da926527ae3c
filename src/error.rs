//! Error types for the collaborative editing core.
//!
//! Nothing in the core is fatal: every variant here is either returned to a
//! caller that logs it, or logged in place and dropped.

use crate::ops::OperationId;
use std::io;
use thiserror::Error;

/// Result type for editing operations.
pub type Result<T> = std::result::Result<T, EditError>;

/// Errors that can occur while editing, parsing or shipping operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EditError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unparseable or unexpected wire message.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Acknowledgment for an operation that is not pending.
    #[error("No pending operation with id {0}")]
    UnknownOperation(OperationId),

    #[error("Not connected")]
    NotConnected,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A collaborator (transport, engine) has not been wired up yet.
    #[error("{0} not set")]
    Unwired(&'static str),
}

impl EditError {
    /// Check if this error came from a malformed or unexpected message.
    #[inline]
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, EditError::Protocol(_) | EditError::Json(_))
    }

    /// Check if this error means the peer link is gone.
    #[inline]
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        match self {
            EditError::NotConnected => true,
            EditError::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
