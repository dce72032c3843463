//! Presenter Core - Command catalog and protocol negotiation for presentation remotes
//!
//! This crate provides:
//! - The closed set of presentation commands and their version ranges
//! - Version negotiation between client and presentation server
//! - Per-connection session state
//! - Transport trait implemented by the embedding app
//! - Error types

/// Protocol version number exchanged during the handshake
pub type ProtocolVersion = u32;

// Version constants
pub const MIN_PROTOCOL_VERSION: ProtocolVersion = 1;
pub const LATEST_PROTOCOL_VERSION: ProtocolVersion = 1;
pub const APP_VERSION_STRING: &str = "0.1.0";

pub mod client;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;

// Re-export common types
pub use client::{ClientConfig, PresenterClient};
pub use error::{CoreError, Result};
pub use protocol::Negotiator;
pub use session::{NegotiationAttempt, Session, SessionState};
pub use transport::{MockTransport, Transport};
pub use types::{Advertisement, Command, VersionRange};
