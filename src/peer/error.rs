use thiserror::Error;

/// Errors from peer connections.
///
/// All of these are per-peer failures: the session discards the candidate
/// and tries another, none of them is fatal to the session.
#[derive(Debug, Error)]
pub enum PeerError {
    /// The TCP connection could not be established.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Network I/O error on an established connection.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream before the 68-byte handshake completed.
    #[error("handshake truncated")]
    TruncatedHandshake,

    /// The handshake length byte or protocol identifier did not match.
    #[error("peer speaks a different protocol")]
    ProtocolMismatch,

    /// The peer is serving a different torrent.
    #[error("info hash mismatch")]
    InfoHashMismatch,

    /// A malformed wire message.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A message type byte outside the known vocabulary.
    #[error("invalid message id: {0}")]
    InvalidMessageId(u8),

    /// I/O was attempted on a closed connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// A bounded deadline elapsed.
    #[error("timeout")]
    Timeout,
}
