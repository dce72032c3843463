//! Transport seam
//!
//! The core never opens sockets or pairs devices. A transport collaborator
//! (Bluetooth, TCP, ...) implements [`Transport`] and the client drives it.

mod mock;

pub use mock::MockTransport;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Advertisement;

/// Connection to a presentation server, supplied by the embedding app
#[async_trait]
pub trait Transport: Send {
    /// Wait for the peer's handshake advertisement
    ///
    /// The advertised range may be malformed; negotiation rejects it.
    async fn remote_advertisement(&mut self) -> Result<Advertisement>;

    /// Send one encoded frame to the peer
    async fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Close the underlying connection
    async fn close(&mut self) -> Result<()>;
}
