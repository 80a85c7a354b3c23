//! swarmlet - BitTorrent client core
//!
//! This library implements the client-facing half of the BitTorrent
//! protocol: deriving a torrent's identity from its metadata, announcing
//! presence and transfer state to an HTTP tracker, and establishing the
//! validated peer wire handshake that precedes piece exchange.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 bencode encoding/decoding
//! - [`metainfo`] - Torrent metainfo and info-hash derivation
//! - [`tracker`] - HTTP tracker announces, compact and dictionary peer lists
//! - [`peer`] - Peer wire handshake and message framing
//! - [`session`] - Per-torrent announce lifecycle and peer workers
//!
//! Piece selection, choke/unchoke policy, and disk storage are future
//! layers; the wire message vocabulary they will dispatch is fixed in
//! [`peer`], but their logic lives above this crate's contract.

pub mod bencode;
pub mod metainfo;
pub mod peer;
pub mod session;
pub mod tracker;

pub use bencode::{BencodeError, Value};
pub use metainfo::{File, Info, InfoHash, Metainfo, MetainfoError};
pub use peer::{Handshake, Message, MessageId, PeerConnection, PeerError, PeerId, PeerState};
pub use session::{Session, SessionError, StatsSnapshot, TransferStats};
pub use tracker::{AnnounceRequest, AnnounceResponse, HttpTracker, Peer, TrackerError, TrackerEvent};
