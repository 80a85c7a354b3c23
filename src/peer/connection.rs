use super::error::PeerError;
use super::message::{Handshake, Message};
use super::peer_id::PeerId;
use super::transport::PeerTransport;
use crate::metainfo::InfoHash;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection lifecycle. `Closed` is reachable from every state, on error
/// or explicit close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// TCP connection established, handshake not yet sent.
    Connecting,
    /// Our 68-byte handshake is on the wire.
    HandshakeSent,
    /// The peer's handshake arrived and passed validation.
    HandshakeValidated,
    /// Ready to exchange framed messages.
    Established,
    /// Socket released; any further I/O fails with `ConnectionClosed`.
    Closed,
}

/// A validated connection to one remote peer.
///
/// The connection owns its socket exclusively until closed. `connect` drives
/// the handshake to completion; afterwards [`send`](Self::send) and
/// [`receive`](Self::receive) exchange framed messages.
pub struct PeerConnection {
    /// The remote peer's socket address.
    pub addr: SocketAddr,
    /// The identity the peer reported in its handshake.
    pub peer_id: Option<PeerId>,
    /// Current lifecycle state.
    pub state: PeerState,
    /// When the TCP connection was established.
    pub connected_at: Instant,
    /// When the last message arrived.
    pub last_message_at: Instant,
    transport: Option<PeerTransport>,
}

impl PeerConnection {
    /// Connects to a peer and performs the handshake exchange.
    ///
    /// # Errors
    ///
    /// - [`PeerError::ConnectFailed`] if the TCP connection fails or times out
    /// - [`PeerError::TruncatedHandshake`] if the peer hangs up mid-handshake
    /// - [`PeerError::ProtocolMismatch`] if the peer speaks something else
    /// - [`PeerError::InfoHashMismatch`] if the peer serves another torrent
    pub async fn connect(
        addr: SocketAddr,
        info_hash: InfoHash,
        our_peer_id: PeerId,
    ) -> Result<Self, PeerError> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                PeerError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "connect timed out",
                ))
            })?
            .map_err(PeerError::ConnectFailed)?;

        let now = Instant::now();
        let mut conn = Self {
            addr,
            peer_id: None,
            state: PeerState::Connecting,
            connected_at: now,
            last_message_at: now,
            transport: Some(PeerTransport::new(stream)),
        };

        match conn.handshake(info_hash, our_peer_id).await {
            Ok(()) => Ok(conn),
            Err(err) => {
                conn.close();
                Err(err)
            }
        }
    }

    async fn handshake(&mut self, info_hash: InfoHash, our_peer_id: PeerId) -> Result<(), PeerError> {
        let transport = self.transport.as_mut().ok_or(PeerError::ConnectionClosed)?;

        let ours = Handshake::new(*info_hash.as_bytes(), *our_peer_id.as_bytes());
        transport.send_handshake(&ours).await?;
        self.state = PeerState::HandshakeSent;

        let theirs = transport.receive_handshake().await?;

        if theirs.info_hash != *info_hash.as_bytes() {
            return Err(PeerError::InfoHashMismatch);
        }
        self.state = PeerState::HandshakeValidated;

        // The remote identity is captured as-is; no further validation.
        self.peer_id = PeerId::from_bytes(&theirs.peer_id);
        self.state = PeerState::Established;

        debug!(addr = %self.addr, peer_id = ?self.peer_id, "peer handshake complete");
        Ok(())
    }

    pub async fn send(&mut self, message: Message) -> Result<(), PeerError> {
        if self.state != PeerState::Established {
            return Err(PeerError::ConnectionClosed);
        }

        match self.transport {
            Some(ref mut transport) => transport.send_message(&message).await,
            None => Err(PeerError::ConnectionClosed),
        }
    }

    pub async fn receive(&mut self) -> Result<Message, PeerError> {
        if self.state != PeerState::Established {
            return Err(PeerError::ConnectionClosed);
        }

        match self.transport {
            Some(ref mut transport) => {
                let message = transport.receive_message().await?;
                self.last_message_at = Instant::now();
                Ok(message)
            }
            None => Err(PeerError::ConnectionClosed),
        }
    }

    /// Releases the socket. Safe to call from any state.
    pub fn close(&mut self) {
        self.transport = None;
        self.state = PeerState::Closed;
    }

    pub fn is_established(&self) -> bool {
        self.state == PeerState::Established && self.transport.is_some()
    }
}
