//! Version negotiation between this client and a presentation server

use bytes::Bytes;
use tracing::{debug, error};

use crate::error::{CoreError, Result};
use crate::types::{Command, VersionRange};
use crate::ProtocolVersion;

/// Frame terminator for the line-based wire convention
const FRAME_TERMINATOR: u8 = b'\n';

/// Stateless negotiation and encoding helpers
///
/// Every function is pure and safe to call from any thread.
pub struct Negotiator;

impl Negotiator {
    /// Pick the protocol version both sides will use
    ///
    /// The agreed version is the highest version present in both ranges.
    ///
    /// # Errors
    /// - `InvalidRange` if either range violates `1 <= min <= max`
    /// - `NoCompatibleVersion` if the ranges do not overlap
    pub fn negotiate(local: VersionRange, remote: VersionRange) -> Result<ProtocolVersion> {
        for range in [&local, &remote] {
            if let Err(e) = range.validate() {
                error!("Negotiation called with malformed range {}", range);
                return Err(e);
            }
        }

        let agreed = local.max.min(remote.max);
        if agreed < local.min.max(remote.min) {
            debug!("No shared version between local {} and remote {}", local, remote);
            return Err(CoreError::NoCompatibleVersion { local, remote });
        }

        debug!("Negotiated protocol version {} (local {}, remote {})", agreed, local, remote);
        Ok(agreed)
    }

    /// Whether `command` is legal under `version`
    #[inline]
    pub fn is_sendable(command: Command, version: ProtocolVersion) -> bool {
        command.version_range().contains(version)
    }

    /// Wire token for `command`
    ///
    /// Encoding is unconditional. Callers check [`Negotiator::is_sendable`] first.
    #[inline]
    pub fn encode(command: Command) -> &'static str {
        command.token()
    }

    /// Newline-terminated token bytes, ready for `send`
    pub fn encode_frame(command: Command) -> Bytes {
        let token = Self::encode(command);
        let mut buf = Vec::with_capacity(token.len() + 1);
        buf.extend_from_slice(token.as_bytes());
        buf.push(FRAME_TERMINATOR);
        Bytes::from(buf)
    }

    /// Catalog commands usable under `version`, in catalog order
    pub fn sendable_commands(version: ProtocolVersion) -> Vec<Command> {
        Command::all()
            .filter(|cmd| Self::is_sendable(*cmd, version))
            .collect()
    }
}
