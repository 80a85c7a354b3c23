use super::error::PeerError;
use super::message::{Handshake, Message, HANDSHAKE_LEN};
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// A handshake leg that does not finish within this deadline counts as a
/// failed peer, not one left to hang.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);
const READ_TIMEOUT: Duration = Duration::from_secs(120);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Framed I/O over a peer's TCP stream.
pub struct PeerTransport {
    stream: TcpStream,
    read_buf: BytesMut,
}

impl PeerTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            read_buf: BytesMut::with_capacity(32 * 1024),
        }
    }

    pub async fn send_handshake(&mut self, handshake: &Handshake) -> Result<(), PeerError> {
        let data = handshake.encode();
        timeout(HANDSHAKE_TIMEOUT, self.stream.write_all(&data))
            .await
            .map_err(|_| PeerError::TruncatedHandshake)??;
        Ok(())
    }

    /// Reads and decodes the peer's 68-byte handshake.
    ///
    /// The whole read is bounded by one deadline; EOF or deadline expiry
    /// before 68 bytes is [`PeerError::TruncatedHandshake`].
    pub async fn receive_handshake(&mut self) -> Result<Handshake, PeerError> {
        timeout(HANDSHAKE_TIMEOUT, self.fill_buf(HANDSHAKE_LEN))
            .await
            .map_err(|_| PeerError::TruncatedHandshake)?
            .map_err(|err| match err {
                PeerError::ConnectionClosed => PeerError::TruncatedHandshake,
                other => other,
            })?;

        let data = self.read_buf.split_to(HANDSHAKE_LEN);
        Handshake::decode(&data)
    }

    pub async fn send_message(&mut self, message: &Message) -> Result<(), PeerError> {
        let data = message.encode();
        timeout(WRITE_TIMEOUT, self.stream.write_all(&data))
            .await
            .map_err(|_| PeerError::Timeout)??;
        Ok(())
    }

    /// Reads one length-prefixed message.
    pub async fn receive_message(&mut self) -> Result<Message, PeerError> {
        timeout(READ_TIMEOUT, self.fill_buf(4))
            .await
            .map_err(|_| PeerError::Timeout)??;

        let length = u32::from_be_bytes([
            self.read_buf[0],
            self.read_buf[1],
            self.read_buf[2],
            self.read_buf[3],
        ]) as usize;

        if length > MAX_MESSAGE_SIZE {
            return Err(PeerError::InvalidMessage(format!(
                "message too large: {}",
                length
            )));
        }

        let total = 4 + length;
        timeout(READ_TIMEOUT, self.fill_buf(total))
            .await
            .map_err(|_| PeerError::Timeout)??;

        let data = self.read_buf.split_to(total);
        Message::decode(data.freeze())
    }

    async fn fill_buf(&mut self, needed: usize) -> Result<(), PeerError> {
        while self.read_buf.len() < needed {
            let n = self.stream.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(PeerError::ConnectionClosed);
            }
        }
        Ok(())
    }

    pub fn peer_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.stream.peer_addr()
    }
}
