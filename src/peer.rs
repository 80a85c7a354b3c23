//! Peer wire protocol (BEP-3): handshake and message framing.
//!
//! Before any piece exchange, both sides perform a fixed 68-byte handshake
//! proving they speak the same protocol and serve the same torrent. After
//! validation the connection carries length-prefixed messages; this module
//! fixes the message vocabulary (choke through cancel plus keep-alive) and
//! produces a validated, framed stream. Dispatching piece traffic on top of
//! it belongs to a piece-exchange layer built above this one.

mod connection;
mod error;
mod message;
mod peer_id;
mod transport;

pub use connection::{PeerConnection, PeerState};
pub use error::PeerError;
pub use message::{Handshake, Message, MessageId, HANDSHAKE_LEN, PROTOCOL};
pub use peer_id::PeerId;
pub use transport::PeerTransport;
