//! Presenter client: negotiation and gated command sending over a transport

use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::protocol::Negotiator;
use crate::session::{Session, SessionState};
use crate::transport::Transport;
use crate::types::{Advertisement, Command, VersionRange};
use crate::{ProtocolVersion, LATEST_PROTOCOL_VERSION, MIN_PROTOCOL_VERSION};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Protocol versions this client understands
    pub local_range: VersionRange,
    /// Maximum wait for the peer's advertised range
    pub handshake_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            local_range: VersionRange {
                min: MIN_PROTOCOL_VERSION,
                max: LATEST_PROTOCOL_VERSION,
            },
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Override the advertised local range
    pub fn with_local_range(mut self, range: VersionRange) -> Self {
        self.local_range = range;
        self
    }

    /// Override the handshake timeout
    pub fn with_handshake_timeout(mut self, handshake_timeout: Duration) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }
}

/// Remote control bound to one transport
///
/// Owns the per-connection [`Session`]; `&mut self` on every transition keeps
/// one negotiation in flight at a time.
pub struct PresenterClient<T: Transport> {
    transport: T,
    session: Session,
    config: ClientConfig,
    /// Advertisement received in the current connection's handshake
    peer: Option<Advertisement>,
}

impl<T: Transport> PresenterClient<T> {
    /// Create a disconnected client
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            session: Session::new(),
            config,
            peer: None,
        }
    }

    /// Run the version handshake and negotiate
    ///
    /// # Errors
    /// - `AlreadyConnected` if a version is already agreed
    /// - `Timeout` if the peer does not advertise within `handshake_timeout`
    /// - transport errors from the handshake
    /// - `NoCompatibleVersion` / `InvalidRange` from negotiation
    pub async fn connect(&mut self) -> Result<ProtocolVersion> {
        let attempt = self.session.begin_negotiation()?;
        self.peer = None;

        let handshake = self.transport.remote_advertisement();
        let remote = match timeout(self.config.handshake_timeout, handshake).await {
            Ok(Ok(remote)) => remote,
            Ok(Err(e)) => {
                warn!("Handshake failed: {}", e);
                self.session.abort_negotiation(attempt)?;
                return Err(e);
            }
            Err(_) => {
                let ms = timeout_millis(self.config.handshake_timeout);
                warn!("Handshake timed out after {}ms", ms);
                self.session.abort_negotiation(attempt)?;
                return Err(CoreError::Timeout(ms));
            }
        };

        info!(
            "Peer {} advertised {} ({} known commands)",
            remote.app_version,
            remote.versions,
            remote.known_commands().len()
        );
        let versions = remote.versions;
        self.peer = Some(remote);
        self.session
            .complete_negotiation(attempt, self.config.local_range, versions)
    }

    /// Send `command` if the agreed version allows it
    ///
    /// Rejected commands never reach the transport and leave the session
    /// as it was. A transport failure ends the session.
    pub async fn send(&mut self, command: Command) -> Result<()> {
        let version = self.session.check(command)?;
        let frame = Negotiator::encode_frame(command);

        if let Err(e) = self.transport.send(&frame).await {
            warn!("Failed to send {}: {}, dropping session", command, e);
            self.session.disconnect();
            self.peer = None;
            return Err(e);
        }

        debug!("Sent {} (protocol v{})", command, version);
        Ok(())
    }

    /// Whether `command` can be sent right now
    pub fn is_sendable(&self, command: Command) -> bool {
        self.session.check(command).is_ok()
    }

    /// Commands the UI may enable right now
    pub fn sendable_commands(&self) -> Vec<Command> {
        self.session.sendable_commands()
    }

    /// Close the transport and discard the agreed version
    pub async fn disconnect(&mut self) -> Result<()> {
        self.session.disconnect();
        self.peer = None;
        info!("Disconnecting from presenter");
        self.transport.close().await
    }

    /// Notify the client that the transport went away on its own
    pub fn on_transport_closed(&mut self) {
        self.session.disconnect();
        self.peer = None;
    }

    /// What the peer advertised during the current connection's handshake
    pub fn peer(&self) -> Option<&Advertisement> {
        self.peer.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn agreed_version(&self) -> Option<ProtocolVersion> {
        self.session.agreed_version()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`
fn timeout_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use bytes::Bytes;

    fn range(min: ProtocolVersion, max: ProtocolVersion) -> VersionRange {
        VersionRange { min, max }
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.local_range, range(1, LATEST_PROTOCOL_VERSION));
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_client_config_custom() {
        let config = ClientConfig::default()
            .with_local_range(range(1, 2))
            .with_handshake_timeout(Duration::from_millis(250));
        assert_eq!(config.local_range, range(1, 2));
        assert_eq!(config.handshake_timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_connect_and_send() {
        let mut client = PresenterClient::new(
            MockTransport::new(range(1, 1)),
            ClientConfig::default(),
        );
        assert_eq!(client.connect().await.unwrap(), 1);
        assert_eq!(client.state(), SessionState::Ready(1));

        client.send(Command::NextSlide).await.unwrap();
        client.send(Command::PrevSlide).await.unwrap();
        assert_eq!(
            client.transport().sent(),
            &[Bytes::from_static(b"nextSlide\n"), Bytes::from_static(b"prevSlide\n")]
        );
        assert_eq!(client.sendable_commands(), Command::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_connect_records_peer_advertisement() {
        let adv = Advertisement {
            versions: range(1, 2),
            app_version: "impress-server 2.1".to_string(),
            commands: vec!["nextSlide".into(), "laserPointer".into()],
        };
        let mut client = PresenterClient::new(
            MockTransport::with_advertisement(adv),
            ClientConfig::default(),
        );
        assert!(client.peer().is_none());

        assert_eq!(client.connect().await.unwrap(), 1);
        let peer = client.peer().unwrap();
        assert_eq!(peer.app_version, "impress-server 2.1");
        assert_eq!(peer.versions, range(1, 2));
        assert_eq!(peer.known_commands(), vec![Command::NextSlide]);

        client.disconnect().await.unwrap();
        assert!(client.peer().is_none());
    }

    #[tokio::test]
    async fn test_incompatible_peer_advertisement_is_kept() {
        let config = ClientConfig::default().with_local_range(range(2, 2));
        let mut client = PresenterClient::new(MockTransport::new(range(1, 1)), config);
        assert!(client.connect().await.is_err());
        assert_eq!(client.peer().map(|p| p.versions), Some(range(1, 1)));
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX)), u64::MAX);
    }

    #[tokio::test]
    async fn test_send_before_connect() {
        let mut client = PresenterClient::new(
            MockTransport::new(range(1, 1)),
            ClientConfig::default(),
        );
        assert!(matches!(client.send(Command::Begin).await, Err(CoreError::NotConnected)));
        assert!(client.transport().sent().is_empty());
        assert!(!client.is_sendable(Command::Begin));
    }

    #[tokio::test]
    async fn test_incompatible_server() {
        let config = ClientConfig::default().with_local_range(range(2, 2));
        let mut client = PresenterClient::new(MockTransport::new(range(1, 1)), config);

        let result = client.connect().await;
        assert!(matches!(result, Err(CoreError::NoCompatibleVersion { .. })));
        assert_eq!(client.state(), SessionState::Failed);
        assert!(client.send(Command::NextSlide).await.is_err());
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_command_is_not_sent() {
        let config = ClientConfig::default().with_local_range(range(1, 2));
        let mut client = PresenterClient::new(MockTransport::new(range(2, 2)), config);
        assert_eq!(client.connect().await.unwrap(), 2);

        let result = client.send(Command::Escape).await;
        assert!(matches!(result, Err(CoreError::CommandNotSendable { version: 2, .. })));
        assert_eq!(client.state(), SessionState::Ready(2));
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_handshake_timeout() {
        let transport =
            MockTransport::new(range(1, 1)).with_handshake_delay(Duration::from_secs(60));
        let mut client = PresenterClient::new(transport, ClientConfig::default());

        let result = client.connect().await;
        assert!(matches!(result, Err(CoreError::Timeout(5000))));
        assert_eq!(client.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_connect_twice_is_rejected() {
        let mut client = PresenterClient::new(
            MockTransport::new(range(1, 1)),
            ClientConfig::default(),
        );
        client.connect().await.unwrap();
        assert!(matches!(client.connect().await, Err(CoreError::AlreadyConnected)));
        assert_eq!(client.agreed_version(), Some(1));
    }

    #[tokio::test]
    async fn test_reconnect_renegotiates() {
        let config = ClientConfig::default().with_local_range(range(1, 3));
        let mut client = PresenterClient::new(MockTransport::new(range(1, 3)), config);
        assert_eq!(client.connect().await.unwrap(), 3);

        client.disconnect().await.unwrap();
        assert_eq!(client.agreed_version(), None);
        assert!(!client.transport().is_open());

        // Same peer, downgraded between connections
        client.transport_mut().reopen();
        client.transport_mut().set_remote(range(1, 1));
        assert_eq!(client.connect().await.unwrap(), 1);
        client.send(Command::Begin).await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_drops_session() {
        let mut client = PresenterClient::new(
            MockTransport::new(range(1, 1)),
            ClientConfig::default(),
        );
        client.connect().await.unwrap();

        client.transport_mut().drop_connection();
        assert!(matches!(client.send(Command::NextSlide).await, Err(CoreError::Transport(_))));
        assert_eq!(client.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_handshake_on_closed_transport() {
        let mut transport = MockTransport::new(range(1, 1));
        transport.drop_connection();
        let mut client = PresenterClient::new(transport, ClientConfig::default());
        assert!(matches!(client.connect().await, Err(CoreError::Transport(_))));
        assert_eq!(client.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_on_transport_closed() {
        let mut client = PresenterClient::new(
            MockTransport::new(range(1, 1)),
            ClientConfig::default(),
        );
        client.connect().await.unwrap();
        client.on_transport_closed();
        assert_eq!(client.state(), SessionState::Disconnected);
        assert!(client.sendable_commands().is_empty());
    }
}
