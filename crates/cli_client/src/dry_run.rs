//! Transport that simulates a peer and prints frames instead of sending them

use async_trait::async_trait;
use presenter_core::{Advertisement, Result, Transport, VersionRange};
use std::io::Write;

/// App version the simulated server reports
const SIMULATED_SERVER: &str = "simulated-server";

/// Simulated peer: advertises a fixed range, writes frames to `out`
pub struct DryRunTransport<W: Write + Send> {
    remote: Advertisement,
    out: W,
}

impl<W: Write + Send> DryRunTransport<W> {
    /// The range is not validated, like a real peer's handshake
    pub fn new(remote: VersionRange, out: W) -> Self {
        Self {
            remote: Advertisement::local(remote).with_app_version(SIMULATED_SERVER),
            out,
        }
    }
}

#[async_trait]
impl<W: Write + Send> Transport for DryRunTransport<W> {
    async fn remote_advertisement(&mut self) -> Result<Advertisement> {
        let payload = self.remote.encode()?;
        Advertisement::decode(&payload)
    }

    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.out.write_all(b"-> ")?;
        self.out.write_all(frame)?;
        self.out.flush()?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
