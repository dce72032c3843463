//! Handshake payload describing what one side of a connection understands

use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{Command, VersionRange};
use crate::APP_VERSION_STRING;

/// Maximum encoded advertisement size (4KB)
const MAX_ADVERTISEMENT_SIZE: usize = 4 * 1024;

/// Version range and command tokens a peer advertises during the handshake
///
/// Commands travel as tokens rather than enum indices so that a newer peer
/// can list commands this build does not know about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Advertisement {
    pub versions: VersionRange,
    /// For logging only
    pub app_version: String,
    pub commands: Vec<String>,
}

impl Advertisement {
    /// Advertisement for this build: every catalog command usable somewhere in `versions`
    pub fn local(versions: VersionRange) -> Self {
        let commands = Command::all()
            .filter(|cmd| cmd.version_range().intersect(&versions).is_some())
            .map(|cmd| cmd.token().to_string())
            .collect();
        Self {
            versions,
            app_version: APP_VERSION_STRING.to_string(),
            commands,
        }
    }

    /// Replace the app version string (peers other than this build)
    pub fn with_app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = app_version.into();
        self
    }

    /// Commands from the advertisement that this build understands, in catalog order
    pub fn known_commands(&self) -> Vec<Command> {
        Command::all()
            .filter(|cmd| self.commands.iter().any(|t| t == cmd.token()))
            .collect()
    }

    /// Encode to postcard bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = to_allocvec(self)?;
        if payload.len() > MAX_ADVERTISEMENT_SIZE {
            return Err(CoreError::MessageTooLarge {
                size: payload.len(),
                max: MAX_ADVERTISEMENT_SIZE,
            });
        }
        Ok(payload)
    }

    /// Decode from postcard bytes
    ///
    /// The version range is not validated here; negotiation does that.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() > MAX_ADVERTISEMENT_SIZE {
            return Err(CoreError::MessageTooLarge {
                size: buf.len(),
                max: MAX_ADVERTISEMENT_SIZE,
            });
        }
        from_bytes(buf).map_err(CoreError::from)
    }
}
