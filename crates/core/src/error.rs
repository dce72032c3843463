//! Error types for presenter-core

use crate::types::{Command, VersionRange};
use crate::ProtocolVersion;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid version range [{min}, {max}]: bounds must satisfy 1 <= min <= max")]
    InvalidRange {
        min: ProtocolVersion,
        max: ProtocolVersion,
    },

    #[error("Cannot connect: incompatible versions (local {local}, remote {remote})")]
    NoCompatibleVersion {
        local: VersionRange,
        remote: VersionRange,
    },

    #[error("Command {command} is not available in protocol version {version}")]
    CommandNotSendable {
        command: Command,
        version: ProtocolVersion,
    },

    #[error("Unknown command token: {0:?}")]
    UnknownCommand(String),

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] postcard::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl CoreError {
    /// Whether the caller can sensibly recover from this error
    ///
    /// Contract violations (malformed ranges, stale negotiation results,
    /// oversized handshake payloads) return `false`.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CoreError::InvalidRange { .. }
                | CoreError::InvalidState(_)
                | CoreError::MessageTooLarge { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;
