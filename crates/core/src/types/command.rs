//! Presentation commands and their protocol-version metadata
//!
//! The catalog is a compatibility contract with deployed servers: once a
//! command has shipped, its token and version range are never altered.
//! Protocol evolution only appends new variants with new ranges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::VersionRange;
use crate::ProtocolVersion;

/// Command sent from the remote to the presentation server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Command {
    /// Switch to the previous slide
    #[serde(rename = "prevSlide")]
    PrevSlide,
    /// Switch to the next slide
    #[serde(rename = "nextSlide")]
    NextSlide,
    /// End the running presentation
    #[serde(rename = "endPres")]
    Escape,
    /// Start the presentation. Exact behavior is defined by the server.
    #[serde(rename = "begin")]
    Begin,
}

/// Static metadata for one catalog entry
#[derive(Debug)]
struct CatalogEntry {
    token: &'static str,
    min_version: ProtocolVersion,
    max_version: ProtocolVersion,
}

/// Indexed by the `Command` discriminant; order must match `Command::ALL`.
static CATALOG: [CatalogEntry; 4] = [
    CatalogEntry {
        token: "prevSlide",
        min_version: 1,
        max_version: 1,
    },
    CatalogEntry {
        token: "nextSlide",
        min_version: 1,
        max_version: 1,
    },
    CatalogEntry {
        token: "endPres",
        min_version: 1,
        max_version: 1,
    },
    CatalogEntry {
        token: "begin",
        min_version: 1,
        max_version: 1,
    },
];

impl Command {
    /// Every defined command, in declaration order
    pub const ALL: [Command; 4] = [
        Command::PrevSlide,
        Command::NextSlide,
        Command::Escape,
        Command::Begin,
    ];

    /// All commands in stable order (used for capability advertisement)
    pub fn all() -> impl Iterator<Item = Command> {
        Self::ALL.into_iter()
    }

    fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self as usize]
    }

    /// Wire token for this command
    pub fn token(self) -> &'static str {
        self.entry().token
    }

    /// First protocol version that understands this command
    pub fn min_version(self) -> ProtocolVersion {
        self.entry().min_version
    }

    /// Last protocol version that understands this command
    pub fn max_version(self) -> ProtocolVersion {
        self.entry().max_version
    }

    /// Inclusive version range in which this command is legal
    pub fn version_range(self) -> VersionRange {
        VersionRange {
            min: self.min_version(),
            max: self.max_version(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Command {
    type Err = CoreError;

    /// Parse a wire token. A trailing `\n` or `\r\n` is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim_end_matches(['\r', '\n']);
        Self::all()
            .find(|cmd| cmd.token() == token)
            .ok_or_else(|| CoreError::UnknownCommand(token.to_string()))
    }
}
