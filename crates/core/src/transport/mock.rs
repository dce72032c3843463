//! In-memory transport for testing

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use super::Transport;
use crate::error::{CoreError, Result};
use crate::types::{Advertisement, VersionRange};

/// Mock transport that records every frame it is asked to send
///
/// The peer's advertisement goes through `encode`/`decode` on every
/// handshake, as it would on a real wire.
pub struct MockTransport {
    remote: Advertisement,
    handshake_delay: Duration,
    sent: Vec<Bytes>,
    open: bool,
}

impl MockTransport {
    /// Create a mock peer advertising `remote` and every catalog command in it
    pub fn new(remote: VersionRange) -> Self {
        Self::with_advertisement(Advertisement::local(remote))
    }

    /// Create a mock peer with a custom advertisement
    pub fn with_advertisement(remote: Advertisement) -> Self {
        Self {
            remote,
            handshake_delay: Duration::ZERO,
            sent: Vec::new(),
            open: true,
        }
    }

    /// Delay the handshake reply
    pub fn with_handshake_delay(mut self, delay: Duration) -> Self {
        self.handshake_delay = delay;
        self
    }

    /// Change what the peer advertises on the next handshake (e.g. after an upgrade)
    pub fn set_remote(&mut self, remote: VersionRange) {
        self.remote.versions = remote;
    }

    /// Reopen after `close` (simulates reconnecting to the same peer)
    pub fn reopen(&mut self) {
        self.open = true;
    }

    /// Simulate the peer dropping the connection
    pub fn drop_connection(&mut self) {
        self.open = false;
    }

    /// Frames sent so far
    pub fn sent(&self) -> &[Bytes] {
        &self.sent
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn remote_advertisement(&mut self) -> Result<Advertisement> {
        if !self.open {
            return Err(CoreError::Transport("Connection is closed".into()));
        }
        if !self.handshake_delay.is_zero() {
            tokio::time::sleep(self.handshake_delay).await;
        }
        let payload = self.remote.encode()?;
        Advertisement::decode(&payload)
    }

    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        if !self.open {
            return Err(CoreError::Transport("Connection is closed".into()));
        }
        self.sent.push(Bytes::copy_from_slice(frame));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}
