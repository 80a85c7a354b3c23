use crate::metainfo::InfoHash;
use crate::peer::PeerId;
use std::fmt::Write;

/// The transfer-lifecycle event reported with an announce.
///
/// A session sends `Started` exactly once, `None` for periodic re-announces,
/// `Completed` at most once when the transfer finishes, and `Stopped` once on
/// shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    None,
    Started,
    Completed,
    Stopped,
}

impl TrackerEvent {
    /// The query-string form; empty for `None`, which is omitted from the
    /// request entirely.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerEvent::None => "",
            TrackerEvent::Started => "started",
            TrackerEvent::Completed => "completed",
            TrackerEvent::Stopped => "stopped",
        }
    }
}

/// A single announce request.
///
/// The numeric fields are read from the session's transfer stats at the
/// moment the announce is issued.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub corrupt: u64,
    pub event: TrackerEvent,
    pub compact: bool,
}

impl AnnounceRequest {
    /// Builds the announce query string.
    ///
    /// `info_hash` and `peer_id` are opaque byte strings, not text: every
    /// byte outside the unreserved set is escaped, including bytes that
    /// happen to be printable.
    pub fn query_string(&self) -> String {
        let mut query = format!(
            "info_hash={}&peer_id={}&port={}&uploaded={}&downloaded={}&left={}&corrupt={}",
            percent_encode(self.info_hash.as_bytes()),
            percent_encode(self.peer_id.as_bytes()),
            self.port,
            self.uploaded,
            self.downloaded,
            self.left,
            self.corrupt,
        );

        if self.event != TrackerEvent::None {
            query.push_str("&event=");
            query.push_str(self.event.as_str());
        }

        query.push_str(if self.compact {
            "&compact=1"
        } else {
            "&compact=0"
        });

        query
    }
}

/// Percent-encodes raw bytes, escaping everything outside the RFC 3986
/// unreserved set.
fn percent_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);

    for &b in bytes {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
    }

    out
}
