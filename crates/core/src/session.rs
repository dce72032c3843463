//! Per-connection negotiation state
//!
//! A `Session` belongs to exactly one connection. The agreed protocol
//! version only exists in the `Ready` state and is dropped on disconnect,
//! so a reconnect always negotiates from scratch.

use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::protocol::Negotiator;
use crate::types::{Command, VersionRange};
use crate::ProtocolVersion;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection (initial)
    Disconnected,
    /// Waiting for the peer's version range
    Negotiating,
    /// Version agreed; commands may be sent
    Ready(ProtocolVersion),
    /// Negotiation failed for this attempt; no commands may be sent
    Failed,
}

/// Ticket identifying one negotiation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationAttempt(u64);

/// Negotiated state for one connection
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    attempt: u64,
}

impl Session {
    /// Create a disconnected session
    pub fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            attempt: 0,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Agreed version, if ready
    pub fn agreed_version(&self) -> Option<ProtocolVersion> {
        match self.state {
            SessionState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Enter `Negotiating` and hand out a ticket for this attempt
    ///
    /// A pending attempt is cancelled: its ticket becomes stale.
    ///
    /// # Errors
    /// `AlreadyConnected` if the session is `Ready`; disconnect first.
    pub fn begin_negotiation(&mut self) -> Result<NegotiationAttempt> {
        match self.state {
            SessionState::Ready(v) => {
                warn!("Negotiation requested while ready at version {}", v);
                return Err(CoreError::AlreadyConnected);
            }
            SessionState::Negotiating => {
                warn!("Cancelling pending negotiation attempt {}", self.attempt);
            }
            SessionState::Disconnected | SessionState::Failed => {}
        }

        self.attempt += 1;
        self.state = SessionState::Negotiating;
        debug!("Negotiation attempt {} started", self.attempt);
        Ok(NegotiationAttempt(self.attempt))
    }

    /// Finish an attempt with the peer's advertised range
    ///
    /// On success the session becomes `Ready`; on negotiation failure it
    /// becomes `Failed` and the error is returned.
    ///
    /// # Errors
    /// - `InvalidState` if `attempt` is not the current attempt
    /// - `InvalidRange` / `NoCompatibleVersion` from negotiation
    pub fn complete_negotiation(
        &mut self,
        attempt: NegotiationAttempt,
        local: VersionRange,
        remote: VersionRange,
    ) -> Result<ProtocolVersion> {
        self.ensure_current(attempt)?;

        match Negotiator::negotiate(local, remote) {
            Ok(version) => {
                self.state = SessionState::Ready(version);
                info!("Session ready at protocol version {}", version);
                Ok(version)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                warn!("Negotiation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Mark the current attempt as failed (transport error, timeout)
    ///
    /// # Errors
    /// `InvalidState` if `attempt` is not the current attempt
    pub fn abort_negotiation(&mut self, attempt: NegotiationAttempt) -> Result<()> {
        self.ensure_current(attempt)?;
        self.state = SessionState::Failed;
        Ok(())
    }

    /// Drop any agreed version and return to `Disconnected`
    pub fn disconnect(&mut self) {
        if let SessionState::Ready(v) = self.state {
            info!("Session at protocol version {} disconnected", v);
        }
        // Invalidate any in-flight ticket as well
        self.attempt += 1;
        self.state = SessionState::Disconnected;
    }

    /// Check that `command` may be sent now; returns the agreed version
    ///
    /// A rejected command leaves the state unchanged.
    ///
    /// # Errors
    /// - `NotConnected` if the session is not `Ready`
    /// - `CommandNotSendable` if the command is outside the agreed version
    pub fn check(&self, command: Command) -> Result<ProtocolVersion> {
        let version = self.agreed_version().ok_or(CoreError::NotConnected)?;
        if !Negotiator::is_sendable(command, version) {
            return Err(CoreError::CommandNotSendable { command, version });
        }
        Ok(version)
    }

    /// Commands the UI may enable right now
    pub fn sendable_commands(&self) -> Vec<Command> {
        self.agreed_version()
            .map(Negotiator::sendable_commands)
            .unwrap_or_default()
    }

    fn ensure_current(&self, attempt: NegotiationAttempt) -> Result<()> {
        if self.state != SessionState::Negotiating || attempt.0 != self.attempt {
            return Err(CoreError::InvalidState(format!(
                "negotiation attempt {} is stale",
                attempt.0
            )));
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
